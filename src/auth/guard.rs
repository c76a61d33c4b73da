//! Role-based authorization.

use std::collections::HashSet;

use crate::auth::TokenClaims;
use crate::error::GatewayError;

/// Allow or deny based on role membership.
///
/// Exact, case-sensitive matching; no role hierarchy. "ADMIN" does not
/// imply "MANAGER", so multi-role routes list every accepted role.
///
/// Absent claims on a restricted route means the table was misconfigured
/// (roles without auth); startup validation catches that, this branch is
/// the runtime backstop.
pub fn authorize(
    claims: Option<&TokenClaims>,
    required: &HashSet<String>,
) -> Result<(), GatewayError> {
    if required.is_empty() {
        return Ok(());
    }

    let claims = claims.ok_or(GatewayError::MissingCredential)?;

    if required.contains(&claims.role) {
        Ok(())
    } else {
        Err(GatewayError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str) -> TokenClaims {
        TokenClaims {
            subject: "user-1".into(),
            email: "user@example.com".into(),
            role: role.into(),
        }
    }

    fn roles(names: &[&str]) -> HashSet<String> {
        names.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn empty_requirement_always_passes() {
        assert!(authorize(None, &HashSet::new()).is_ok());
        assert!(authorize(Some(&claims("USER")), &HashSet::new()).is_ok());
    }

    #[test]
    fn membership_is_exact_and_case_sensitive() {
        let required = roles(&["ADMIN", "MANAGER"]);
        assert!(authorize(Some(&claims("ADMIN")), &required).is_ok());
        assert!(authorize(Some(&claims("MANAGER")), &required).is_ok());
        assert!(matches!(
            authorize(Some(&claims("admin")), &required),
            Err(GatewayError::Forbidden)
        ));
        assert!(matches!(
            authorize(Some(&claims("USER")), &required),
            Err(GatewayError::Forbidden)
        ));
    }

    #[test]
    fn missing_claims_on_restricted_route() {
        let required = roles(&["ADMIN"]);
        assert!(matches!(
            authorize(None, &required),
            Err(GatewayError::MissingCredential)
        ));
    }
}
