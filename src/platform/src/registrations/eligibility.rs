//! Registration eligibility.
//!
//! [`evaluate`] decides whether a caller may register for an event and in
//! which attendance modes. Checks run in a fixed order and the first failing
//! one decides the outcome:
//!
//! 1. the event is published;
//! 2. member-exclusive events need a caller whose company is an active member;
//! 3. the event hasn't started yet;
//! 4. the caller is authenticated;
//! 5. the caller has no record for the event yet;
//! 6. some mode has a free seat within both the event capacity and the
//!    caller's per-brand cap.
//!
//! The per-brand cap is counted separately for each mode. Online seats are
//! exempt from it when the event has `free_online` set.

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use metadata::accounts::Account;
use metadata::attendance::AttendanceMode;
use metadata::attendance::AttendanceRecord;
use metadata::companies::Company;
use metadata::events::Event;
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DenialReason {
    NotPublished,
    LoginRequired,
    NotAMember,
    EventPassed,
    NoVacancies,
    BrandLimitReached,
    NoVacanciesNow,
    /// The requested mode has no room for the caller even though another
    /// mode does.
    ModeUnavailable,
}

impl DenialReason {
    /// Stable numeric code, reported as `code` in API errors.
    pub fn code(&self) -> u64 {
        match self {
            DenialReason::NotPublished => 1,
            DenialReason::LoginRequired => 2,
            DenialReason::NotAMember => 3,
            DenialReason::EventPassed => 4,
            DenialReason::NoVacancies => 5,
            DenialReason::BrandLimitReached => 6,
            DenialReason::NoVacanciesNow => 7,
            DenialReason::ModeUnavailable => 8,
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DenialReason::NotPublished => "this event is not available for registration",
            DenialReason::LoginRequired => "please log in to register for this event",
            DenialReason::NotAMember => {
                "this event is exclusive to members and your company is not an active member"
            }
            DenialReason::EventPassed => "this event has already happened",
            DenialReason::NoVacancies => "there are no vacancies left for this event",
            DenialReason::BrandLimitReached => {
                "your company has reached its registration limit for this event"
            }
            DenialReason::NoVacanciesNow => "no vacancies are available right now",
            DenialReason::ModeUnavailable => "the chosen attendance mode is not available",
        };

        write!(f, "{msg}")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Denial {
    pub reason: DenialReason,
    pub code: u64,
    pub message: String,
}

impl From<DenialReason> for Denial {
    fn from(reason: DenialReason) -> Self {
        Denial {
            reason,
            code: reason.code(),
            message: reason.to_string(),
        }
    }
}

/// Registrant fields used to prefill the registration form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantInfo {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub id: u64,
    pub name: String,
    pub tax_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub can_register_presential: bool,
    pub can_register_online: bool,
    pub vacancy_total: u32,
    pub vacancy_online: u32,
    pub remaining_presential: u32,
    pub remaining_online: u32,
    pub vacancies_per_brand: u32,
    pub company_remaining_presential: u32,
    /// `None` when online registrations don't count against the brand cap.
    pub company_remaining_online: Option<u32>,
    pub registrant: RegistrantInfo,
    pub company: Option<CompanyInfo>,
}

impl Availability {
    pub fn allows(&self, mode: AttendanceMode) -> bool {
        match mode {
            AttendanceMode::InPerson => self.can_register_presential,
            AttendanceMode::Online => self.can_register_online,
        }
    }

    /// Why `mode` is closed. A full brand cap outranks sold-out seats here:
    /// the caller can't take that mode even if a seat frees up.
    pub fn denial_for(&self, mode: AttendanceMode) -> DenialReason {
        let (remaining, company_remaining) = match mode {
            AttendanceMode::InPerson => (
                self.remaining_presential,
                Some(self.company_remaining_presential),
            ),
            AttendanceMode::Online => (self.remaining_online, self.company_remaining_online),
        };

        if company_remaining == Some(0) {
            DenialReason::BrandLimitReached
        } else if remaining == 0 {
            DenialReason::NoVacancies
        } else {
            DenialReason::ModeUnavailable
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Eligibility {
    Eligible(Box<Availability>),
    #[serde(rename_all = "camelCase")]
    AlreadyRegistered {
        attendance_id: u64,
        mode: AttendanceMode,
        message: String,
    },
    Denied(Denial),
    /// The caller has to log in first. Kept apart from [`Eligibility::Denied`]
    /// so clients can offer a login instead of an error.
    Unauthenticated(Denial),
}

impl Eligibility {
    fn denied(reason: DenialReason) -> Self {
        Eligibility::Denied(reason.into())
    }

    fn unauthenticated() -> Self {
        Eligibility::Unauthenticated(DenialReason::LoginRequired.into())
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible(_))
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Eligibility::Denied(denial) | Eligibility::Unauthenticated(denial) => {
                Some(denial.reason)
            }
            _ => None,
        }
    }
}

/// The authenticated caller with the company it belongs to, if any.
#[derive(Debug, Clone)]
pub struct Caller {
    pub account: Account,
    pub company: Option<Company>,
}

impl Caller {
    fn is_member(&self) -> bool {
        self.company.as_ref().map(|c| c.active).unwrap_or(false)
    }

    /// A caller without a company is a brand of its own.
    fn same_brand(&self, record: &AttendanceRecord) -> bool {
        match self.account.company_id {
            Some(company_id) => record.company_id == Some(company_id),
            None => record.account_id == self.account.id,
        }
    }

    pub fn registrant_info(&self) -> RegistrantInfo {
        RegistrantInfo {
            name: self.account.full_name(),
            email: self.account.email.clone(),
            position: self.account.position.clone(),
            document: self.account.document.clone(),
            phone: self.account.phone.clone(),
        }
    }

    pub fn company_info(&self) -> Option<CompanyInfo> {
        self.company.as_ref().map(|c| CompanyInfo {
            id: c.id,
            name: c.name.clone(),
            tax_id: c.tax_id.clone(),
        })
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    presential: u32,
    online: u32,
}

impl Counts {
    fn of<'a>(records: impl Iterator<Item = &'a AttendanceRecord>) -> Self {
        records.fold(Counts::default(), |mut counts, record| {
            match record.mode {
                AttendanceMode::InPerson => counts.presential = counts.presential.saturating_add(1),
                AttendanceMode::Online => counts.online = counts.online.saturating_add(1),
            }
            counts
        })
    }
}

/// Decides whether `caller` (`None` for anonymous) may register for `event`,
/// given the event's current `attendance` list. Pure: same inputs, same
/// answer.
pub fn evaluate(
    event: &Event,
    caller: Option<&Caller>,
    attendance: &[AttendanceRecord],
    now: DateTime<Utc>,
) -> Eligibility {
    if !event.is_published {
        return Eligibility::denied(DenialReason::NotPublished);
    }

    if event.exclusive_for_members {
        match caller {
            None => return Eligibility::unauthenticated(),
            Some(caller) if !caller.is_member() => {
                return Eligibility::denied(DenialReason::NotAMember);
            }
            Some(_) => {}
        }
    }

    if now > event.starts_at {
        return Eligibility::denied(DenialReason::EventPassed);
    }

    let Some(caller) = caller else {
        return Eligibility::unauthenticated();
    };

    if let Some(record) = attendance
        .iter()
        .find(|record| record.account_id == caller.account.id)
    {
        return Eligibility::AlreadyRegistered {
            attendance_id: record.id,
            mode: record.mode,
            message: "you are already registered for this event".to_string(),
        };
    }

    let total = Counts::of(attendance.iter());
    let remaining_presential = event.vacancy_total.saturating_sub(total.presential);
    let remaining_online = event.vacancy_online.saturating_sub(total.online);

    let brand = Counts::of(attendance.iter().filter(|record| caller.same_brand(record)));
    let cap = event.vacancies_per_brand;
    let brand_presential_full = brand.presential >= cap;
    let brand_online_full = !event.free_online && brand.online >= cap;

    let can_register_presential = remaining_presential > 0 && !brand_presential_full;
    let can_register_online = remaining_online > 0 && !brand_online_full;

    if !can_register_presential && !can_register_online {
        let reason = if remaining_presential == 0 && remaining_online == 0 {
            DenialReason::NoVacancies
        } else if (remaining_presential > 0 && brand_presential_full)
            || (remaining_online > 0 && brand_online_full)
        {
            DenialReason::BrandLimitReached
        } else {
            DenialReason::NoVacanciesNow
        };

        return Eligibility::denied(reason);
    }

    Eligibility::Eligible(Box::new(Availability {
        can_register_presential,
        can_register_online,
        vacancy_total: event.vacancy_total,
        vacancy_online: event.vacancy_online,
        remaining_presential,
        remaining_online,
        vacancies_per_brand: cap,
        company_remaining_presential: cap.saturating_sub(brand.presential),
        company_remaining_online: if event.free_online {
            None
        } else {
            Some(cap.saturating_sub(brand.online))
        },
        registrant: caller.registrant_info(),
        company: caller.company_info(),
    }))
}
