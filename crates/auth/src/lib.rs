//! `bizconsole-auth`: the menu permission engine (authorization boundary).
//!
//! This crate is intentionally decoupled from HTTP and storage: it owns the
//! menu taxonomy, the grant value types and the evaluator that answers
//! `(key, action)` queries for a subject.

pub mod action;
pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod grants;
pub mod matrix;
pub mod menu;
pub mod principal;
pub mod roles;

pub use action::{Action, ActionSet, UnknownAction};
pub use authorize::{AuthzError, Decision, DecisionReason, PermissionEvaluator};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use grants::{GrantIssue, GrantSet, RawGrants, Validated, validate_grants};
pub use matrix::{ActionToggle, MatrixRow, PermissionMatrix, TogglePayload, toggles_to_raw};
pub use menu::{FlatEntry, MenuNode, MenuTaxonomy, TaxonomyError};
pub use principal::Subject;
pub use roles::SubjectRole;

pub use bizconsole_core::SubjectId;
