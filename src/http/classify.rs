use crate::types::{ErrorKind, StatusPolicy};

/// How a single probe response is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Status in [200, 400).
    Success,
    /// The endpoint refused or does not exist, but the server answered.
    Tolerated(u16),
    Failed(ErrorKind),
}

const TOLERATED_STATUSES: [u16; 3] = [401, 403, 404];

pub fn classify_status(status: u16, policy: StatusPolicy) -> Classification {
    match status {
        200..=399 => Classification::Success,
        s if policy == StatusPolicy::Lenient && TOLERATED_STATUSES.contains(&s) => {
            Classification::Tolerated(s)
        }
        500..=599 => Classification::Failed(ErrorKind::ServerError),
        _ => Classification::Failed(ErrorKind::Other),
    }
}
