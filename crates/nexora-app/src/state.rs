// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use time::Date;
use tracing::{debug, warn};

use crate::pagination::{clamp_page, page_range, page_summary, total_pages};
use crate::{
    Activity, ActivityDraft, ActivityId, ActivityStorage, BookingInput, ClientFormInput,
    DEFAULT_PAGE_SIZE, seed_activities,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Single(ActivityId),
    /// Every activity in the current selection.
    Bulk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityCommand {
    Add(ActivityDraft),
    SubmitIntake { form: ClientFormInput, today: Date },
    SubmitBooking { booking: BookingInput, today: Date },
    ToggleSelect(ActivityId),
    ToggleSelectAll,
    RequestDelete(DeleteTarget),
    ConfirmDelete,
    CancelDelete,
    SetPage(usize),
    OpenDetail(ActivityId),
    CloseDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    ActivityAdded(ActivityId),
    SubmissionRejected(String),
    SelectionChanged(usize),
    DeleteRequested(DeleteTarget),
    DeleteCancelled,
    ActivitiesRemoved(Vec<ActivityId>),
    PageChanged(usize),
    DetailOpened(ActivityId),
    DetailClosed,
    PersistFailed(String),
}

impl ActivityEvent {
    pub const fn changes_collection(&self) -> bool {
        matches!(self, Self::ActivityAdded(_) | Self::ActivitiesRemoved(_))
    }
}

/// Activity table state: rows, selection, page, pending deletion and the
/// row open in the detail drawer.
///
/// Invariants held after every [`PortalState::apply`]:
/// - every selected id names a row in the collection
/// - `1 <= current_page <= total_pages`
/// - the detail drawer never names a removed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalState {
    activities: Vec<Activity>,
    selection: BTreeSet<ActivityId>,
    page: usize,
    page_size: usize,
    pending_deletion: Option<DeleteTarget>,
    detail: Option<ActivityId>,
}

impl Default for PortalState {
    fn default() -> Self {
        Self::new(seed_activities(), DEFAULT_PAGE_SIZE)
    }
}

impl PortalState {
    pub fn new(activities: Vec<Activity>, page_size: usize) -> Self {
        Self {
            activities,
            selection: BTreeSet::new(),
            page: 1,
            page_size: page_size.max(1),
            pending_deletion: None,
            detail: None,
        }
    }

    pub fn apply(&mut self, command: ActivityCommand) -> Vec<ActivityEvent> {
        match command {
            ActivityCommand::Add(draft) => self.add(draft),
            ActivityCommand::SubmitIntake { form, today } => match form.to_draft(today) {
                Ok(draft) => self.add(draft),
                Err(error) => vec![ActivityEvent::SubmissionRejected(error.to_string())],
            },
            ActivityCommand::SubmitBooking { booking, today } => self.add(booking.to_draft(today)),
            ActivityCommand::ToggleSelect(id) => self.toggle_select(id),
            ActivityCommand::ToggleSelectAll => self.toggle_select_all(),
            ActivityCommand::RequestDelete(target) => self.request_delete(target),
            ActivityCommand::ConfirmDelete => self.confirm_delete(),
            ActivityCommand::CancelDelete => match self.pending_deletion.take() {
                Some(_) => vec![ActivityEvent::DeleteCancelled],
                None => Vec::new(),
            },
            ActivityCommand::SetPage(page) => self.set_page(page),
            ActivityCommand::OpenDetail(id) => {
                if !self.contains(&id) {
                    return Vec::new();
                }
                self.detail = Some(id.clone());
                vec![ActivityEvent::DetailOpened(id)]
            }
            ActivityCommand::CloseDetail => match self.detail.take() {
                Some(_) => vec![ActivityEvent::DetailClosed],
                None => Vec::new(),
            },
        }
    }

    fn add(&mut self, draft: ActivityDraft) -> Vec<ActivityEvent> {
        let id = ActivityId::for_collection_len(self.activities.len());
        self.activities.insert(
            0,
            Activity {
                id: id.clone(),
                date: draft.date,
                client_name: draft.client_name,
                company: draft.company,
                phone: draft.phone,
                status: draft.status,
            },
        );
        vec![ActivityEvent::ActivityAdded(id)]
    }

    fn toggle_select(&mut self, id: ActivityId) -> Vec<ActivityEvent> {
        if !self.contains(&id) {
            return Vec::new();
        }
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
        vec![ActivityEvent::SelectionChanged(self.selection.len())]
    }

    fn toggle_select_all(&mut self) -> Vec<ActivityEvent> {
        let all = self.all_ids();
        if self.selection.len() == all.len() {
            self.selection.clear();
        } else {
            self.selection = all;
        }
        vec![ActivityEvent::SelectionChanged(self.selection.len())]
    }

    fn request_delete(&mut self, target: DeleteTarget) -> Vec<ActivityEvent> {
        if self.pending_deletion.is_some() {
            return Vec::new();
        }
        if target == DeleteTarget::Bulk && self.selection.is_empty() {
            return Vec::new();
        }
        self.pending_deletion = Some(target.clone());
        vec![ActivityEvent::DeleteRequested(target)]
    }

    fn confirm_delete(&mut self) -> Vec<ActivityEvent> {
        let Some(target) = self.pending_deletion.take() else {
            return Vec::new();
        };

        let (doomed, selection_changed) = match target {
            DeleteTarget::Bulk => {
                let taken = std::mem::take(&mut self.selection);
                let changed = !taken.is_empty();
                (taken, changed)
            }
            DeleteTarget::Single(id) => {
                let changed = self.selection.remove(&id);
                (BTreeSet::from([id]), changed)
            }
        };

        let mut events = Vec::new();
        if selection_changed {
            events.push(ActivityEvent::SelectionChanged(self.selection.len()));
        }

        let mut removed = Vec::new();
        self.activities.retain(|activity| {
            if doomed.contains(&activity.id) {
                removed.push(activity.id.clone());
                false
            } else {
                true
            }
        });
        if removed.is_empty() {
            return Vec::new();
        }
        events.push(ActivityEvent::ActivitiesRemoved(removed));

        if self.detail.as_ref().is_some_and(|id| doomed.contains(id)) {
            self.detail = None;
            events.push(ActivityEvent::DetailClosed);
        }

        let clamped = clamp_page(self.page, self.activities.len(), self.page_size);
        if clamped != self.page {
            self.page = clamped;
            events.push(ActivityEvent::PageChanged(clamped));
        }
        events
    }

    fn set_page(&mut self, page: usize) -> Vec<ActivityEvent> {
        if page < 1 || page > self.total_pages() || page == self.page {
            return Vec::new();
        }
        self.page = page;
        vec![ActivityEvent::PageChanged(page)]
    }

    fn contains(&self, id: &ActivityId) -> bool {
        self.activities.iter().any(|activity| &activity.id == id)
    }

    fn all_ids(&self) -> BTreeSet<ActivityId> {
        self.activities
            .iter()
            .map(|activity| activity.id.clone())
            .collect()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn find(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|activity| &activity.id == id)
    }

    pub fn page_activities(&self) -> &[Activity] {
        &self.activities[page_range(self.page, self.activities.len(), self.page_size)]
    }

    pub fn selection(&self) -> &BTreeSet<ActivityId> {
        &self.selection
    }

    pub fn is_selected(&self, id: &ActivityId) -> bool {
        self.selection.contains(id)
    }

    /// State of the header checkbox.
    pub fn all_selected(&self) -> bool {
        !self.activities.is_empty() && self.selection.len() == self.all_ids().len()
    }

    pub const fn current_page(&self) -> usize {
        self.page
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.activities.len(), self.page_size)
    }

    pub fn page_summary(&self) -> String {
        page_summary(self.page, self.activities.len(), self.page_size)
    }

    pub fn pending_deletion(&self) -> Option<&DeleteTarget> {
        self.pending_deletion.as_ref()
    }

    pub fn confirmation_message(&self) -> Option<String> {
        self.pending_deletion.as_ref().map(|target| match target {
            DeleteTarget::Bulk => format!(
                "Are you sure you want to delete {} selected records? This action cannot be undone.",
                self.selection.len()
            ),
            DeleteTarget::Single(_) => {
                "Are you sure you want to delete this record? This action cannot be undone."
                    .to_owned()
            }
        })
    }

    pub fn detail_id(&self) -> Option<&ActivityId> {
        self.detail.as_ref()
    }

    pub fn detail(&self) -> Option<&Activity> {
        self.detail.as_ref().and_then(|id| self.find(id))
    }
}

/// Owns the table state and the storage port; persists the collection after
/// every command that changes it.
#[derive(Debug)]
pub struct ActivityController<S> {
    state: PortalState,
    storage: S,
}

impl<S: ActivityStorage> ActivityController<S> {
    /// Loads stored activities, or seeds and stores the default set.
    pub fn load(mut storage: S, page_size: usize) -> Result<Self> {
        let activities = match storage.load().context("load stored activities")? {
            Some(activities) => {
                debug!(count = activities.len(), "loaded stored activities");
                activities
            }
            None => {
                let seed = seed_activities();
                storage
                    .save(&seed)
                    .context("store default activities on first start")?;
                debug!(count = seed.len(), "seeded default activities");
                seed
            }
        };
        Ok(Self {
            state: PortalState::new(activities, page_size),
            storage,
        })
    }

    pub fn dispatch(&mut self, command: ActivityCommand) -> Vec<ActivityEvent> {
        let mut events = self.state.apply(command);
        if events.iter().any(ActivityEvent::changes_collection) {
            match self.storage.save(self.state.activities()) {
                Ok(()) => debug!(
                    count = self.state.activities().len(),
                    "persisted activities"
                ),
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "failed to persist activities");
                    events.push(ActivityEvent::PersistFailed(format!("{error:#}")));
                }
            }
        }
        events
    }

    pub fn state(&self) -> &PortalState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivityCommand, ActivityController, ActivityEvent, DeleteTarget, PortalState};
    use crate::{
        ActivityId, ActivityStatus, ActivityStorage, BookingInput, ClientFormInput,
        MemoryStorage, seed_activities,
    };
    use anyhow::Result;
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::October, 16).expect("valid date")
    }

    fn id(raw: &str) -> ActivityId {
        ActivityId::from(raw)
    }

    fn intake(name: &str, email: &str) -> ActivityCommand {
        ActivityCommand::SubmitIntake {
            form: ClientFormInput {
                name: name.to_owned(),
                email: email.to_owned(),
                ..ClientFormInput::blank()
            },
            today: today(),
        }
    }

    #[test]
    fn eleven_rows_span_two_pages() {
        let mut state = PortalState::default();
        assert_eq!(state.total_pages(), 2);

        let events = state.apply(ActivityCommand::SetPage(2));
        assert_eq!(events, vec![ActivityEvent::PageChanged(2)]);
        assert_eq!(state.page_activities().len(), 1);
        assert_eq!(state.page_activities()[0].id, id("#1011"));

        let events = state.apply(ActivityCommand::SetPage(3));
        assert!(events.is_empty());
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn set_page_zero_is_ignored() {
        let mut state = PortalState::default();
        let before = state.clone();
        assert!(state.apply(ActivityCommand::SetPage(0)).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn intake_prepends_pending_record() {
        let mut state = PortalState::default();
        let events = state.apply(intake("Test", "t@t.com"));
        assert_eq!(events, vec![ActivityEvent::ActivityAdded(id("#1012"))]);

        let first = &state.activities()[0];
        assert_eq!(first.id, id("#1012"));
        assert_eq!(first.status, ActivityStatus::Pending);
        assert_eq!(first.client_name, "Test");
        assert_eq!(first.date, today());
        assert_eq!(state.activities().len(), 12);
    }

    #[test]
    fn intake_without_email_changes_nothing() {
        let mut state = PortalState::default();
        let before = state.clone();
        let events = state.apply(intake("Test", ""));
        assert!(matches!(
            events.as_slice(),
            [ActivityEvent::SubmissionRejected(reason)] if reason.contains("email")
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn intake_accepts_whitespace_name() {
        let mut state = PortalState::default();
        let events = state.apply(intake("   ", "t@t.com"));
        assert_eq!(events, vec![ActivityEvent::ActivityAdded(id("#1012"))]);
        assert_eq!(state.activities()[0].client_name, "   ");
    }

    #[test]
    fn booking_adds_call_scheduled_guest() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::SubmitBooking {
            booking: BookingInput::default(),
            today: today(),
        });
        let first = &state.activities()[0];
        assert_eq!(first.status, ActivityStatus::CallScheduled);
        assert_eq!(first.client_name, "Guest Client");
    }

    #[test]
    fn bulk_delete_clears_selection() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::ToggleSelect(id("#1001")));
        state.apply(ActivityCommand::ToggleSelect(id("#1002")));
        assert_eq!(state.selection().len(), 2);

        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Bulk));
        assert_eq!(
            state.confirmation_message().as_deref(),
            Some(
                "Are you sure you want to delete 2 selected records? This action cannot be undone."
            )
        );

        let events = state.apply(ActivityCommand::ConfirmDelete);
        assert_eq!(
            events,
            vec![
                ActivityEvent::SelectionChanged(0),
                ActivityEvent::ActivitiesRemoved(vec![id("#1001"), id("#1002")]),
            ]
        );
        assert!(state.selection().is_empty());
        assert_eq!(state.activities().len(), 9);
        assert!(state.find(&id("#1001")).is_none());
        assert!(state.pending_deletion().is_none());
    }

    #[test]
    fn bulk_request_without_selection_is_ignored() {
        let mut state = PortalState::default();
        assert!(
            state
                .apply(ActivityCommand::RequestDelete(DeleteTarget::Bulk))
                .is_empty()
        );
        assert!(state.pending_deletion().is_none());
    }

    #[test]
    fn second_request_does_not_overwrite_pending_one() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1003",
        ))));
        let events = state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1004",
        ))));
        assert!(events.is_empty());
        assert_eq!(
            state.pending_deletion(),
            Some(&DeleteTarget::Single(id("#1003")))
        );
    }

    #[test]
    fn cancel_keeps_rows() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1003",
        ))));
        let events = state.apply(ActivityCommand::CancelDelete);
        assert_eq!(events, vec![ActivityEvent::DeleteCancelled]);
        assert_eq!(state.activities().len(), 11);
        assert!(state.pending_deletion().is_none());
    }

    #[test]
    fn confirm_without_request_is_noop() {
        let mut state = PortalState::default();
        let before = state.clone();
        assert!(state.apply(ActivityCommand::ConfirmDelete).is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn deleting_detail_row_closes_drawer() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::OpenDetail(id("#1005")));
        assert_eq!(
            state.detail().map(|a| a.client_name.as_str()),
            Some("Ellen Ripley")
        );

        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1005",
        ))));
        let events = state.apply(ActivityCommand::ConfirmDelete);
        assert_eq!(
            events,
            vec![
                ActivityEvent::ActivitiesRemoved(vec![id("#1005")]),
                ActivityEvent::DetailClosed,
            ]
        );
        assert!(state.detail_id().is_none());
    }

    #[test]
    fn deleting_other_row_keeps_drawer_open() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::OpenDetail(id("#1005")));
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1006",
        ))));
        state.apply(ActivityCommand::ConfirmDelete);
        assert_eq!(state.detail_id(), Some(&id("#1005")));
    }

    #[test]
    fn deleting_absent_row_only_closes_dialog() -> Result<()> {
        let mut controller = ActivityController::load(MemoryStorage::new(), 10)?;
        assert_eq!(controller.storage().save_count(), 1);

        controller.dispatch(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#9999",
        ))));
        assert!(controller.dispatch(ActivityCommand::ConfirmDelete).is_empty());
        assert!(controller.state().pending_deletion().is_none());
        assert_eq!(controller.state().activities().len(), 11);
        assert_eq!(controller.storage().save_count(), 1);
        Ok(())
    }

    #[test]
    fn bulk_delete_closes_drawer_on_selected_row() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::ToggleSelect(id("#1002")));
        state.apply(ActivityCommand::ToggleSelect(id("#1004")));
        state.apply(ActivityCommand::OpenDetail(id("#1004")));
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Bulk));

        let events = state.apply(ActivityCommand::ConfirmDelete);
        assert_eq!(
            events,
            vec![
                ActivityEvent::SelectionChanged(0),
                ActivityEvent::ActivitiesRemoved(vec![id("#1002"), id("#1004")]),
                ActivityEvent::DetailClosed,
            ]
        );
        assert!(state.detail_id().is_none());
        assert!(state.detail().is_none());
    }

    #[test]
    fn shrinking_below_page_boundary_clamps_page() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::SetPage(2));
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1011",
        ))));
        let events = state.apply(ActivityCommand::ConfirmDelete);
        assert_eq!(events.last(), Some(&ActivityEvent::PageChanged(1)));
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn toggle_select_ignores_unknown_ids() {
        let mut state = PortalState::default();
        assert!(
            state
                .apply(ActivityCommand::ToggleSelect(id("#4242")))
                .is_empty()
        );
        assert!(state.selection().is_empty());
    }

    #[test]
    fn toggle_select_all_covers_every_page() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::ToggleSelectAll);
        assert_eq!(state.selection().len(), 11);
        assert!(state.all_selected());

        state.apply(ActivityCommand::ToggleSelect(id("#1011")));
        assert!(!state.all_selected());
        state.apply(ActivityCommand::ToggleSelectAll);
        assert!(state.all_selected());

        state.apply(ActivityCommand::ToggleSelectAll);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn empty_collection_has_one_page_and_no_header_check() {
        let mut state = PortalState::new(Vec::new(), 10);
        assert_eq!(state.total_pages(), 1);
        assert!(!state.all_selected());
        state.apply(ActivityCommand::ToggleSelectAll);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn size_based_ids_collide_after_delete() {
        let mut state = PortalState::default();
        state.apply(ActivityCommand::RequestDelete(DeleteTarget::Single(id(
            "#1001",
        ))));
        state.apply(ActivityCommand::ConfirmDelete);
        state.apply(intake("Test", "t@t.com"));

        let duplicates = state
            .activities()
            .iter()
            .filter(|activity| activity.id == id("#1011"))
            .count();
        assert_eq!(duplicates, 2, "known defect: ids derive from collection size");
    }

    #[test]
    fn controller_seeds_empty_storage() -> Result<()> {
        let controller = ActivityController::load(MemoryStorage::new(), 10)?;
        assert_eq!(controller.state().activities(), seed_activities().as_slice());
        assert_eq!(controller.storage().save_count(), 1);
        Ok(())
    }

    #[test]
    fn controller_keeps_stored_rows() -> Result<()> {
        let stored = seed_activities()[..3].to_vec();
        let controller =
            ActivityController::load(MemoryStorage::with_activities(stored.clone()), 10)?;
        assert_eq!(controller.state().activities(), stored.as_slice());
        assert_eq!(controller.storage().save_count(), 0);
        Ok(())
    }

    #[test]
    fn controller_persists_only_collection_changes() -> Result<()> {
        let mut controller = ActivityController::load(MemoryStorage::new(), 10)?;
        controller.dispatch(ActivityCommand::ToggleSelect(id("#1001")));
        controller.dispatch(ActivityCommand::SetPage(2));
        controller.dispatch(ActivityCommand::OpenDetail(id("#1002")));
        assert_eq!(controller.storage().save_count(), 1);

        controller.dispatch(intake("Test", "t@t.com"));
        assert_eq!(controller.storage().save_count(), 2);
        let stored = controller
            .storage_mut()
            .load()?
            .expect("activities stored after add");
        assert_eq!(stored[0].id, id("#1012"));
        Ok(())
    }
}
