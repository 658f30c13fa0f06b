// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use time::Date;

use crate::ActivityStatus;

pub const INTAKE_COMPANY: &str = "New Client";
pub const BOOKING_COMPANY: &str = "-";
pub const BOOKING_GUEST_NAME: &str = "Guest Client";
pub const MISSING_PHONE: &str = "-";

/// Everything needed to append an activity except its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub date: Date,
    pub client_name: String,
    pub company: String,
    pub phone: String,
    pub status: ActivityStatus,
}

/// The "fill the form" intake panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientFormInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub agree_phone: bool,
    pub agree_email: bool,
}

/// The "book a call" panel. Shares name and phone with the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingInput {
    pub name: String,
    pub phone: String,
    pub date: Option<Date>,
}

impl ClientFormInput {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("client name is required -- enter a first and last name and retry");
        }
        if self.email.is_empty() {
            bail!("client email is required -- enter an email address and retry");
        }
        Ok(())
    }

    pub fn to_draft(&self, today: Date) -> Result<ActivityDraft> {
        self.validate()?;
        Ok(ActivityDraft {
            date: today,
            client_name: self.name.clone(),
            company: INTAKE_COMPANY.to_owned(),
            phone: phone_or_placeholder(&self.phone),
            status: ActivityStatus::Pending,
        })
    }
}

impl BookingInput {
    pub fn to_draft(&self, today: Date) -> ActivityDraft {
        let client_name = if self.name.is_empty() {
            BOOKING_GUEST_NAME.to_owned()
        } else {
            self.name.clone()
        };
        ActivityDraft {
            date: self.date.unwrap_or(today),
            client_name,
            company: BOOKING_COMPANY.to_owned(),
            phone: phone_or_placeholder(&self.phone),
            status: ActivityStatus::CallScheduled,
        }
    }
}

fn phone_or_placeholder(phone: &str) -> String {
    if phone.is_empty() {
        MISSING_PHONE.to_owned()
    } else {
        phone.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingInput, ClientFormInput};
    use crate::ActivityStatus;
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::March, 4).expect("valid date")
    }

    #[test]
    fn intake_requires_name_and_email() {
        let mut form = ClientFormInput {
            email: "t@t.com".to_owned(),
            ..ClientFormInput::blank()
        };
        let error = form.validate().expect_err("missing name should fail");
        assert!(error.to_string().contains("client name is required"));

        form.name = "Test".to_owned();
        form.email = String::new();
        let error = form.validate().expect_err("missing email should fail");
        assert!(error.to_string().contains("client email is required"));
    }

    #[test]
    fn intake_accepts_whitespace_only_fields() {
        let form = ClientFormInput {
            name: "   ".to_owned(),
            email: "   ".to_owned(),
            ..ClientFormInput::blank()
        };
        let draft = form.to_draft(today()).expect("non-empty fields are accepted");
        assert_eq!(draft.client_name, "   ");
        assert_eq!(draft.status, ActivityStatus::Pending);
    }

    #[test]
    fn intake_email_has_no_format_check() {
        let form = ClientFormInput {
            name: "Test".to_owned(),
            email: "not-an-email".to_owned(),
            ..ClientFormInput::blank()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn intake_draft_is_pending_new_client() {
        let form = ClientFormInput {
            name: "Test".to_owned(),
            email: "t@t.com".to_owned(),
            ..ClientFormInput::blank()
        };
        let draft = form.to_draft(today()).expect("valid intake");
        assert_eq!(draft.status, ActivityStatus::Pending);
        assert_eq!(draft.company, "New Client");
        assert_eq!(draft.phone, "-");
        assert_eq!(draft.date, today());
    }

    #[test]
    fn booking_defaults_guest_name_and_today() {
        let draft = BookingInput::default().to_draft(today());
        assert_eq!(draft.client_name, "Guest Client");
        assert_eq!(draft.company, "-");
        assert_eq!(draft.status, ActivityStatus::CallScheduled);
        assert_eq!(draft.date, today());
    }

    #[test]
    fn booking_keeps_chosen_date_and_phone() {
        let chosen = Date::from_calendar_date(2026, Month::April, 1).expect("valid date");
        let draft = BookingInput {
            name: "Ellen Ripley".to_owned(),
            phone: "077-4445556".to_owned(),
            date: Some(chosen),
        }
        .to_draft(today());
        assert_eq!(draft.date, chosen);
        assert_eq!(draft.phone, "077-4445556");
        assert_eq!(draft.client_name, "Ellen Ripley");
    }
}
