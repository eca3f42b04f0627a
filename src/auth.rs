//! Credential checks against the store's account registry, plus the
//! fresh-token discipline: a token is re-issued before every write so a
//! stale cached credential is never trusted.

use uuid::Uuid;

use crate::error::{AuthError, Result};
use crate::state::Identity;
use crate::store::Store;
use crate::validate;

pub fn register(
    store: &mut Store,
    email: &str,
    password: &str,
    confirm_password: Option<&str>,
) -> Result<Identity> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidCredential.into());
    }
    if let Some(confirm) = confirm_password {
        if confirm != password {
            return Err(AuthError::PasswordMismatch.into());
        }
    }
    if !validate::password_is_strong(password) {
        return Err(AuthError::WeakPassword.into());
    }

    let owner_id = store.create_account(email, password)?;
    tracing::info!("registered account for {email}");
    Ok(Identity {
        owner_id,
        email: email.to_string(),
        token: Uuid::new_v4().to_string(),
    })
}

pub fn login(store: &Store, email: &str, password: &str) -> Result<Identity> {
    let email = email.trim();
    let owner_id = store.verify_account(email, password)?;
    tracing::info!("login for {email}");
    Ok(Identity {
        owner_id,
        email: email.to_string(),
        token: Uuid::new_v4().to_string(),
    })
}

/// Re-issues the session token, failing if the account has vanished since
/// login. Called before every write.
pub fn refresh_token(store: &Store, identity: &mut Identity) -> Result<()> {
    if !store.account_exists(&identity.owner_id)? {
        return Err(AuthError::UnknownIdentity(identity.email.clone()).into());
    }
    identity.token = Uuid::new_v4().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn temp_store(tag: &str) -> Store {
        let p = std::env::temp_dir().join(format!("edupaneld-auth-{}-{}", tag, Uuid::new_v4()));
        Store::open(&p).expect("open store")
    }

    #[test]
    fn register_enforces_strength_and_mismatch() {
        let mut store = temp_store("register");
        assert!(matches!(
            register(&mut store, "t@school.test", "weak", None),
            Err(Error::Auth(AuthError::WeakPassword))
        ));
        assert!(matches!(
            register(&mut store, "t@school.test", "Str0ng!pass", Some("Other1!pass")),
            Err(Error::Auth(AuthError::PasswordMismatch))
        ));
        assert!(matches!(
            register(&mut store, "not-an-email", "Str0ng!pass", None),
            Err(Error::Auth(AuthError::InvalidCredential))
        ));

        let identity =
            register(&mut store, "t@school.test", "Str0ng!pass", Some("Str0ng!pass")).expect("ok");
        assert_eq!(identity.email, "t@school.test");
        assert!(!identity.token.is_empty());
    }

    #[test]
    fn refresh_rotates_token_and_detects_missing_account() {
        let mut store = temp_store("refresh");
        let mut identity =
            register(&mut store, "t@school.test", "Str0ng!pass", None).expect("register");
        let before = identity.token.clone();
        refresh_token(&store, &mut identity).expect("refresh");
        assert_ne!(identity.token, before);

        identity.owner_id = "gone".to_string();
        assert!(matches!(
            refresh_token(&store, &mut identity),
            Err(Error::Auth(AuthError::UnknownIdentity(_)))
        ));
    }
}
