mod eligibility;

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use common::rbac::Permission;
pub use eligibility::evaluate;
pub use eligibility::Availability;
pub use eligibility::Caller;
pub use eligibility::CompanyInfo;
pub use eligibility::Denial;
pub use eligibility::DenialReason;
pub use eligibility::Eligibility;
pub use eligibility::RegistrantInfo;
use metadata::attendance::AttendanceMode;
use metadata::attendance::AttendanceRecord;
use metadata::attendance::CreateAttendanceRequest;
use metadata::error::MetadataError;
use metadata::MetadataProvider;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::error::RegistrationError;
use crate::notifications::Notification;
use crate::notifications::Notifier;
use crate::Context;
use crate::ListResponse;
use crate::PlatformError;
use crate::Result;

pub struct Registrations {
    md: Arc<MetadataProvider>,
    notifier: Arc<dyn Notifier>,
}

impl Registrations {
    pub fn new(md: Arc<MetadataProvider>, notifier: Arc<dyn Notifier>) -> Self {
        Self { md, notifier }
    }

    fn caller(&self, ctx: &Context) -> Result<Option<Caller>> {
        let Some(account_id) = ctx.account_id else {
            return Ok(None);
        };

        let account = self.md.accounts.get_by_id(account_id)?;
        let company = match account.company_id {
            None => None,
            Some(company_id) => match self.md.companies.get_by_id(company_id) {
                Ok(company) => Some(company),
                // a dangling company link means no membership
                Err(MetadataError::NotFound(_)) => None,
                Err(err) => return Err(err.into()),
            },
        };

        Ok(Some(Caller { account, company }))
    }

    async fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifier.notify(&notification).await {
            warn!(
                "can't send notification for attendance {}: {err}",
                notification.attendance().id
            );
        }
    }

    /// Tells the caller whether and how they can register for the event.
    pub async fn check(&self, ctx: Context, event_id: u64) -> Result<Eligibility> {
        let event = self.md.events.get_by_id(event_id)?;
        let caller = self.caller(&ctx)?;
        let attendance = self.md.attendance.list_by_event(event_id)?;

        Ok(evaluate(&event, caller.as_ref(), &attendance, Utc::now()))
    }

    /// Registers the caller in `req.mode`.
    ///
    /// Eligibility is re-evaluated under the event's lock, so two concurrent
    /// requests can't both take the last seat.
    pub async fn register(
        &self,
        ctx: Context,
        event_id: u64,
        req: RegisterRequest,
    ) -> Result<Attendance> {
        let caller = self.caller(&ctx)?;
        let now = Utc::now();
        let mut event_title = String::new();

        let res = self.md.attendance.create_guarded(
            event_id,
            |event, attendance| -> Result<CreateAttendanceRequest> {
                event_title = event.title.clone();

                match evaluate(event, caller.as_ref(), attendance, now) {
                    Eligibility::Eligible(availability) => {
                        if !availability.allows(req.mode) {
                            return Err(RegistrationError::Denied(
                                availability.denial_for(req.mode),
                            )
                            .into());
                        }
                        let caller = caller.as_ref().ok_or(RegistrationError::Unauthenticated)?;

                        Ok(snapshot(caller, req.mode))
                    }
                    Eligibility::AlreadyRegistered { attendance_id, .. } => {
                        Err(RegistrationError::AlreadyRegistered(attendance_id).into())
                    }
                    Eligibility::Denied(denial) => {
                        Err(RegistrationError::Denied(denial.reason).into())
                    }
                    Eligibility::Unauthenticated(_) => Err(RegistrationError::Unauthenticated.into()),
                }
            },
        );

        let record = match res {
            Ok(record) => record,
            Err(PlatformError::Metadata(MetadataError::AlreadyExists(_))) => {
                let account_id = ctx.account_id()?;
                return match self.md.attendance.find(event_id, account_id)? {
                    Some(existing) => Err(RegistrationError::AlreadyRegistered(existing.id).into()),
                    None => Err(PlatformError::AlreadyExists(
                        "already registered for this event".to_string(),
                    )),
                };
            }
            Err(err) => return Err(err),
        };
        info!(
            "account {} registered for event {event_id} ({})",
            record.account_id, record.mode
        );

        let attendance: Attendance = record.into();
        self.notify(Notification::Registered {
            event_title,
            attendance: attendance.clone(),
        })
        .await;

        Ok(attendance)
    }

    /// Removes a record. Owners may cancel until the event starts, callers
    /// with `ManageAttendance` at any time.
    pub async fn cancel(&self, ctx: Context, attendance_id: u64) -> Result<Attendance> {
        let record = self.md.attendance.get_by_id(attendance_id)?;
        let event = self.md.events.get_by_id(record.event_id)?;

        if !ctx.has_permission(Permission::ManageAttendance) {
            if ctx.account_id()? != record.account_id {
                return Err(PlatformError::Forbidden(
                    "can't cancel someone else's registration".to_string(),
                ));
            }
            if Utc::now() > event.starts_at {
                return Err(RegistrationError::Denied(DenialReason::EventPassed).into());
            }
        }

        let record = self.md.attendance.delete(attendance_id)?;
        info!(
            "attendance {attendance_id} of event {} cancelled",
            record.event_id
        );

        let attendance: Attendance = record.into();
        self.notify(Notification::Cancelled {
            event_title: event.title,
            attendance: attendance.clone(),
        })
        .await;

        Ok(attendance)
    }

    pub async fn check_in(
        &self,
        ctx: Context,
        attendance_id: u64,
        req: CheckInRequest,
    ) -> Result<Attendance> {
        ctx.check_permission(Permission::CheckIn)?;

        let record =
            self.md
                .attendance
                .set_checked_in(attendance_id, req.checked_in, ctx.account_id()?)?;

        Ok(record.into())
    }

    pub async fn list_for_event(&self, ctx: Context, event_id: u64) -> Result<ListResponse<Attendance>> {
        ctx.check_permission(Permission::ViewAttendance)?;

        // unknown events are 404, not an empty list
        self.md.events.get_by_id(event_id)?;
        let list = self.md.attendance.list_by_event(event_id)?;

        Ok(ListResponse::new(list.into_iter().map(Attendance::from).collect()))
    }

    /// Registrations of the caller.
    pub async fn list_mine(&self, ctx: Context) -> Result<ListResponse<Attendance>> {
        let list = self.md.attendance.list_by_account(ctx.account_id()?)?;

        Ok(ListResponse::new(list.into_iter().map(Attendance::from).collect()))
    }
}

fn snapshot(caller: &Caller, mode: AttendanceMode) -> CreateAttendanceRequest {
    let registrant = caller.registrant_info();
    let company = caller.company_info();

    CreateAttendanceRequest {
        account_id: caller.account.id,
        company_id: caller.account.company_id,
        mode,
        name: registrant.name,
        email: registrant.email,
        position: registrant.position,
        document: registrant.document,
        phone: registrant.phone,
        company_name: company.as_ref().map(|c| c.name.clone()),
        company_tax_id: company.map(|c| c.tax_id),
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub event_id: u64,
    pub account_id: u64,
    pub company_id: Option<u64>,
    pub mode: AttendanceMode,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_tax_id: Option<String>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<u64>,
}

impl From<AttendanceRecord> for Attendance {
    fn from(value: AttendanceRecord) -> Self {
        Attendance {
            id: value.id,
            created_at: value.created_at,
            event_id: value.event_id,
            account_id: value.account_id,
            company_id: value.company_id,
            mode: value.mode,
            name: value.name,
            email: value.email,
            position: value.position,
            document: value.document,
            phone: value.phone,
            company_name: value.company_name,
            company_tax_id: value.company_tax_id,
            checked_in: value.checked_in,
            checked_in_at: value.checked_in_at,
            checked_in_by: value.checked_in_by,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub mode: AttendanceMode,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[serde(default = "default_checked_in")]
    pub checked_in: bool,
}

fn default_checked_in() -> bool {
    true
}
