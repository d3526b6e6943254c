use caps::{CapSet, Capability};

use crate::privilege::PrivilegeLevel;

pub fn check() -> PrivilegeLevel {
    PrivilegeLevel::from_checks(effective_root(), net_raw_effective())
}

fn effective_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// A failed capability query counts as "not held".
fn net_raw_effective() -> bool {
    caps::has_cap(None, CapSet::Effective, Capability::CAP_NET_RAW).unwrap_or(false)
}
