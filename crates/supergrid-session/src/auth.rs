//! Authentication hook for resolving connection identity.
//!
//! supergrid does not verify credentials itself — that belongs to the
//! account store (a web session layer, a user table, an external
//! provider). The server calls [`Authenticator::authenticate`] with the
//! opaque token from the client's `hello` and gets back a [`Party`].

use rand::Rng;
use supergrid_protocol::AccountId;

use crate::{AuthError, Party};

/// Resolves a client's handshake token into a [`Party`].
///
/// `Send + Sync + 'static` because the server shares one authenticator
/// across every connection task.
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the given token and returns who this connection is.
    ///
    /// # Errors
    /// [`AuthError::Failed`] when the token is invalid, expired, or
    /// rejected by the account store. The connection is then closed
    /// without ever reaching a room.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Party, AuthError>> + Send;
}

/// Mints a guest [`Party`] under the given display name.
///
/// Guest account ids carry a `guest-` prefix plus 32 random bits, so the
/// guest id space never collides with registered ids and two guests with
/// the same display name stay distinct.
pub fn issue_guest(name: &str) -> Party {
    let mut rng = rand::rng();
    let bytes: [u8; 4] = rng.random();
    let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let party = Party {
        account: AccountId(format!("guest-{suffix}")),
        name: name.to_string(),
        guest: true,
    };
    tracing::debug!(account = %party.account, name, "guest issued");
    party
}
