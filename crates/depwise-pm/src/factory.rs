//! Adapter construction.

use crate::adapters::{BunAdapter, NpmAdapter, PnpmAdapter, YarnAdapter};
use crate::context::AdapterContext;
use crate::traits::PackageManager;
use depwise_core::PackageManagerKind;

/// Build the adapter for `kind`.
pub fn create_package_manager(
    kind: PackageManagerKind,
    ctx: AdapterContext,
) -> Box<dyn PackageManager> {
    match kind {
        PackageManagerKind::Npm => Box::new(NpmAdapter::new(ctx)),
        PackageManagerKind::Yarn => Box::new(YarnAdapter::new(ctx)),
        PackageManagerKind::Pnpm => Box::new(PnpmAdapter::new(ctx)),
        PackageManagerKind::Bun => Box::new(BunAdapter::new(ctx)),
    }
}
