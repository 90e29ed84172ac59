// service/lifecycle.rs
//! Job state machine. These functions only decide; JobService loads the row
//! under lock and persists what they return.
use crate::{
    models::jobmodel::{Job, JobParty, JobStatus},
    service::error::ServiceError,
};

/// Persisted part of a job that transitions may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobState {
    pub status: JobStatus,
    pub client_confirmed: bool,
    pub vendor_confirmed: bool,
}

impl From<&Job> for JobState {
    fn from(job: &Job) -> Self {
        JobState {
            status: job.status,
            client_confirmed: job.client_confirmed,
            vendor_confirmed: job.vendor_confirmed,
        }
    }
}

/// `pending -> in_progress`, vendor only. Flags are left as they are.
pub fn accept(job: &Job, acting_user: i32) -> Result<JobState, ServiceError> {
    if acting_user != job.vendor_id {
        return Err(ServiceError::UnauthorizedJobAccess(acting_user, job.id));
    }

    if job.status != JobStatus::Pending {
        return Err(ServiceError::InvalidJobStatus {
            job_id: job.id,
            status: job.status,
            action: "accept",
        });
    }

    Ok(JobState {
        status: JobStatus::InProgress,
        ..JobState::from(job)
    })
}

/// Records the acting party's confirmation. Returns `None` when nothing
/// changes: the job is already completed, or this party already confirmed.
pub fn confirm_completion(job: &Job, acting_user: i32) -> Result<Option<JobState>, ServiceError> {
    let party = job
        .party_of(acting_user)
        .ok_or(ServiceError::UnauthorizedJobAccess(acting_user, job.id))?;

    match job.status {
        JobStatus::Completed => return Ok(None),
        JobStatus::InProgress => {}
        JobStatus::Pending | JobStatus::Cancelled => {
            return Err(ServiceError::InvalidJobStatus {
                job_id: job.id,
                status: job.status,
                action: "confirm completion",
            })
        }
    }

    let mut next = JobState::from(job);
    match party {
        JobParty::Contractor => next.client_confirmed = true,
        JobParty::Vendor => next.vendor_confirmed = true,
    }

    if next.client_confirmed && next.vendor_confirmed {
        next.status = JobStatus::Completed;
    }

    if next == JobState::from(job) {
        Ok(None)
    } else {
        Ok(Some(next))
    }
}

/// Reads an administrative status literal. Only the four lowercase values
/// are accepted.
pub fn parse_status(literal: &str) -> Result<JobStatus, ServiceError> {
    JobStatus::parse(literal).ok_or_else(|| {
        ServiceError::invalid_argument(format!(
            "'{}' is not a valid job status. Valid values: {}",
            literal,
            JobStatus::valid_values()
        ))
    })
}

/// Administrative overwrite of the status, allowed from any state. Forcing
/// `completed` also sets both flags so a completed job is always fully
/// confirmed.
pub fn override_status(job: &Job, status: JobStatus) -> JobState {
    let mut next = JobState {
        status,
        ..JobState::from(job)
    };
    if status == JobStatus::Completed {
        next.client_confirmed = true;
        next.vendor_confirmed = true;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::error::ErrorKind;
    use chrono::Utc;

    const CONTRACTOR: i32 = 10;
    const VENDOR: i32 = 20;
    const STRANGER: i32 = 30;

    fn job(status: JobStatus, client: bool, vendor: bool) -> Job {
        Job {
            id: 1,
            contractor_id: CONTRACTOR,
            vendor_id: VENDOR,
            service_id: 5,
            status,
            start_date: None,
            end_date: None,
            total_amount: None,
            client_confirmed: client,
            vendor_confirmed: vendor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn apply(job: &mut Job, state: JobState) {
        job.status = state.status;
        job.client_confirmed = state.client_confirmed;
        job.vendor_confirmed = state.vendor_confirmed;
    }

    #[test]
    fn vendor_accepts_pending_job() {
        let next = accept(&job(JobStatus::Pending, false, false), VENDOR).unwrap();
        assert_eq!(next.status, JobStatus::InProgress);
        assert!(!next.client_confirmed && !next.vendor_confirmed);
    }

    #[test]
    fn only_the_vendor_may_accept() {
        for user in [CONTRACTOR, STRANGER] {
            let err = accept(&job(JobStatus::Pending, false, false), user).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Forbidden);
        }
    }

    #[test]
    fn accept_outside_pending_is_invalid_state() {
        for status in [JobStatus::InProgress, JobStatus::Completed, JobStatus::Cancelled] {
            let err = accept(&job(status, false, false), VENDOR).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState);
            assert!(err.to_string().contains(status.to_str()));
        }
    }

    #[test]
    fn authorization_is_checked_before_state() {
        let err = accept(&job(JobStatus::Completed, true, true), STRANGER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn either_confirmation_order_completes_once() {
        for order in [[CONTRACTOR, VENDOR], [VENDOR, CONTRACTOR]] {
            let mut current = job(JobStatus::InProgress, false, false);

            let first = confirm_completion(&current, order[0]).unwrap().unwrap();
            assert_eq!(first.status, JobStatus::InProgress);
            apply(&mut current, first);

            let second = confirm_completion(&current, order[1]).unwrap().unwrap();
            assert_eq!(second.status, JobStatus::Completed);
            assert!(second.client_confirmed && second.vendor_confirmed);
            apply(&mut current, second);

            // a repeat from either side changes nothing
            assert_eq!(confirm_completion(&current, order[0]).unwrap(), None);
            assert_eq!(confirm_completion(&current, order[1]).unwrap(), None);
        }
    }

    #[test]
    fn repeated_confirmation_by_same_party_is_a_noop() {
        let current = job(JobStatus::InProgress, true, false);
        assert_eq!(confirm_completion(&current, CONTRACTOR).unwrap(), None);
    }

    #[test]
    fn strangers_cannot_confirm() {
        let err = confirm_completion(&job(JobStatus::InProgress, false, false), STRANGER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn confirmation_requires_in_progress() {
        for status in [JobStatus::Pending, JobStatus::Cancelled] {
            let err = confirm_completion(&job(status, false, false), VENDOR).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
    }

    #[test]
    fn self_dealing_user_confirms_as_contractor() {
        let mut own = job(JobStatus::InProgress, false, false);
        own.vendor_id = CONTRACTOR;
        let next = confirm_completion(&own, CONTRACTOR).unwrap().unwrap();
        assert!(next.client_confirmed);
        assert!(!next.vendor_confirmed);
    }

    #[test]
    fn override_rejects_unknown_literal() {
        let err = parse_status("cancelado").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("pending, in_progress, completed, cancelled"));
    }

    #[test]
    fn override_is_case_sensitive() {
        assert!(parse_status("Completed").is_err());
        assert_eq!(parse_status("cancelled").unwrap(), JobStatus::Cancelled);
    }

    #[test]
    fn override_ignores_state_machine_order() {
        let next = override_status(&job(JobStatus::Completed, true, true), JobStatus::Pending);
        assert_eq!(next.status, JobStatus::Pending);
        assert!(next.client_confirmed && next.vendor_confirmed);
    }

    #[test]
    fn override_to_completed_sets_both_flags() {
        let next = override_status(&job(JobStatus::Pending, false, false), JobStatus::Completed);
        assert_eq!(next.status, JobStatus::Completed);
        assert!(next.client_confirmed && next.vendor_confirmed);
    }
}
