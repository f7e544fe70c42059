// Use cases layer: guest directory workflows and the admin sign-in flow.

pub mod admin_login;
pub mod admin_logout;
pub mod guest_directory;
pub mod resolve_invitation;
pub mod verify_admin;

#[cfg(test)]
pub(crate) mod test_support;

pub use guest_directory::{GuestDirectory, GuestSnapshot};
pub use resolve_invitation::{
    DEFAULT_INVITATION_PARAM, InvitationLookup, PublicInvitation, ResolveInvitationUseCase,
};
