//! Vendor records and their status history

use crate::{ProjectId, UserId, VendorId, VendorStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate supplier under evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Cumulative free-text notes; status changes append one line each.
    #[serde(default)]
    pub notes: String,
    pub status: VendorStatus,
    pub status_changed_at: DateTime<Utc>,
    pub status_changed_by: UserId,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tombstone. Deleted vendors stay in the store for the audit trail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<UserId>,
}

impl Vendor {
    /// Build a fresh vendor in `identified`.
    pub fn new(
        project_id: ProjectId,
        draft: NewVendor,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: draft.id.unwrap_or_else(VendorId::generate),
            project_id,
            name: draft.name,
            description: draft.description,
            website: draft.website,
            notes: draft.notes.unwrap_or_default(),
            status: VendorStatus::Identified,
            status_changed_at: now,
            status_changed_by: created_by,
            status_history: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply a status update in place. Callers are responsible for the
    /// transition-table check and the expected-status guard.
    pub fn apply_status_update(&mut self, update: &StatusUpdate) {
        let change = StatusChange {
            from: self.status,
            to: update.to,
            changed_at: update.changed_at,
            changed_by: update.changed_by.clone(),
            note: update.note.clone(),
        };
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(&change.note_line());

        self.status = update.to;
        self.status_changed_at = update.changed_at;
        self.status_changed_by = update.changed_by.clone();
        self.updated_at = update.changed_at;
        self.status_history.push(change);
    }
}

/// Creation payload for a vendor
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewVendor {
    /// Caller-supplied id; one is generated when absent.
    #[serde(default)]
    pub id: Option<VendorId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewVendor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: VendorId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Editable descriptive fields. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VendorDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl VendorDetails {
    pub fn apply_to(&self, vendor: &mut Vendor, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            vendor.name = name.clone();
        }
        if let Some(description) = &self.description {
            vendor.description = Some(description.clone());
        }
        if let Some(website) = &self.website {
            vendor.website = Some(website.clone());
        }
        vendor.updated_at = now;
    }
}

/// The write issued for a validated transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub to: VendorStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: UserId,
    #[serde(default)]
    pub note: Option<String>,
}

/// One entry of a vendor's status history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: VendorStatus,
    pub to: VendorStatus,
    pub changed_at: DateTime<Utc>,
    pub changed_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusChange {
    /// `[2026-01-01T00:00:00+00:00] identified -> long_list by u1: note`
    pub fn note_line(&self) -> String {
        let mut line = format!(
            "[{}] {} -> {} by {}",
            self.changed_at.to_rfc3339(),
            self.from,
            self.to,
            self.changed_by
        );
        if let Some(note) = self.note.as_deref().filter(|n| !n.trim().is_empty()) {
            line.push_str(": ");
            line.push_str(note.trim());
        }
        line
    }
}
