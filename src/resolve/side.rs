use crate::catalog::{Project, SideSupport};
use crate::error::Error;
use crate::pack::Side;

/// Derive where a project applies from its two "unsupported" flags.
///
/// Anything other than `unsupported` (including unknown values) counts as
/// supported.
pub fn infer_side(project: &Project) -> Result<Side, Error> {
    let client = project.client_side != SideSupport::Unsupported;
    let server = project.server_side != SideSupport::Unsupported;

    match (client, server) {
        (true, true) => Ok(Side::Both),
        (true, false) => Ok(Side::Client),
        (false, true) => Ok(Side::Server),
        (false, false) => Err(Error::SideConflict {
            project: project.id.clone(),
        }),
    }
}
