//! Extraction of access-control overwrites into portable, name-keyed form.

use space_host::{LiveOverwrite, LiveRole, OverwriteTarget};
use tracing::debug;

use crate::snapshot::PermissionOverwriteRecord;

/// Converts the overwrites of one category or channel into portable
/// records keyed by role name.
///
/// Only role-scoped overwrites are kept; member-scoped overwrites have no
/// stable cross-space identity and are dropped. An overwrite whose role
/// cannot be found in `roles` is skipped with a diagnostic, never an
/// error. Order is preserved.
pub fn extract_overwrites(
    entity_name: &str,
    overwrites: &[LiveOverwrite],
    roles: &[LiveRole],
) -> Vec<PermissionOverwriteRecord> {
    let mut records = Vec::new();
    for overwrite in overwrites {
        let role_id = match &overwrite.target {
            OverwriteTarget::Role(role_id) => role_id,
            OverwriteTarget::Member(_) => continue,
        };
        match roles.iter().find(|role| &role.id == role_id) {
            Some(role) => records.push(PermissionOverwriteRecord {
                role_name: role.name.clone(),
                allow: overwrite.allow.to_string(),
                deny: overwrite.deny.to_string(),
            }),
            None => {
                debug!(
                    entity = entity_name,
                    role_id, "overwrite references unknown role, skipping"
                );
            }
        }
    }
    records
}
