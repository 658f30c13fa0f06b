// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Month};

use crate::{Activity, ActivityId, ActivityStatus};

#[rustfmt::skip]
const SEED_ACTIVITIES: [(&str, (i32, Month, u8), &str, &str, &str, ActivityStatus); 11] = [
    ("#1001", (2024, Month::May, 20), "Alice Smith", "Tech Solutions", "077-1234567", ActivityStatus::Pending),
    ("#1002", (2024, Month::May, 22), "Mark Jones", "Innovate Inc", "077-7654321", ActivityStatus::Completed),
    ("#1003", (2024, Month::May, 23), "Sarah Connor", "SkyNet Systems", "077-9988776", ActivityStatus::InProgress),
    ("#1004", (2024, Month::May, 25), "James Cameron", "Avatar Corp", "077-1112223", ActivityStatus::Pending),
    ("#1005", (2024, Month::May, 26), "Ellen Ripley", "Weyland-Yutani", "077-4445556", ActivityStatus::Completed),
    ("#1006", (2024, Month::May, 27), "Marty McFly", "Delorean Inc", "077-8889990", ActivityStatus::CallScheduled),
    ("#1007", (2024, Month::May, 28), "Tony Stark", "Stark Ind", "077-3334445", ActivityStatus::InProgress),
    ("#1008", (2024, Month::May, 29), "Bruce Wayne", "Wayne Ent", "077-2223334", ActivityStatus::Completed),
    ("#1009", (2024, Month::May, 30), "Peter Parker", "Daily Bugle", "077-6667778", ActivityStatus::Pending),
    ("#1010", (2024, Month::June, 1), "Clark Kent", "Daily Planet", "077-5556667", ActivityStatus::CallScheduled),
    ("#1011", (2024, Month::June, 2), "Diana Prince", "Themyscira", "077-9990001", ActivityStatus::Completed),
];

/// Default table contents used when storage holds nothing yet.
pub fn seed_activities() -> Vec<Activity> {
    SEED_ACTIVITIES
        .iter()
        .filter_map(|(id, (year, month, day), client, company, phone, status)| {
            let date = Date::from_calendar_date(*year, *month, *day).ok()?;
            Some(Activity {
                id: ActivityId::from(*id),
                date,
                client_name: (*client).to_owned(),
                company: (*company).to_owned(),
                phone: (*phone).to_owned(),
                status: *status,
            })
        })
        .collect()
}
