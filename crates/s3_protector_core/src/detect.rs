//! Violation predicates over ACL snapshots and access-block configurations.
//!
//! Bucket ACLs are checked by scanning grantee URIs for the public group
//! markers; object ACLs are checked structurally (a single grant held by the
//! owner). The two checks intentionally differ and must not be unified.

use crate::contract::{
    AccessControlSnapshot, Grant, PublicAccessBlockConfiguration, ALL_USERS_MARKER,
    AUTHENTICATED_USERS_MARKER, LOG_DELIVERY_MARKER,
};

/// Concatenation of every grantee URI in grant order.
pub fn grantee_uri_scan(snapshot: &AccessControlSnapshot) -> String {
    snapshot
        .grants
        .iter()
        .filter_map(Grant::grantee_uri)
        .collect()
}

/// Substring match, so a marker anywhere in the scanned URIs counts.
pub fn bucket_acl_violation(snapshot: &AccessControlSnapshot) -> bool {
    let scan = grantee_uri_scan(snapshot);
    scan.contains(ALL_USERS_MARKER) || scan.contains(AUTHENTICATED_USERS_MARKER)
}

pub fn log_delivery_grants(snapshot: &AccessControlSnapshot) -> Vec<Grant> {
    snapshot
        .grants
        .iter()
        .filter(|grant| {
            grant
                .grantee_uri()
                .is_some_and(|uri| uri.contains(LOG_DELIVERY_MARKER))
        })
        .cloned()
        .collect()
}

/// Private means exactly one grant, held by the owner.
pub fn object_acl_is_private(snapshot: &AccessControlSnapshot) -> bool {
    let [grant] = snapshot.grants.as_slice() else {
        return false;
    };

    match (snapshot.owner_id(), grant.grantee_id()) {
        (Some(owner_id), Some(grantee_id)) => owner_id == grantee_id,
        _ => false,
    }
}

pub fn access_block_violation(configuration: &PublicAccessBlockConfiguration) -> bool {
    !configuration.is_fully_blocked()
}
