//! Declarative admin-console registration.
//!
//! The management console is schema-driven: this registry describes, per
//! entity, which columns the list view shows, which filters it offers, how
//! the detail form is grouped, and which related entities are editable
//! inline. It carries no behavior; the console renders it and talks to the
//! admin endpoints for the actual reads and writes.

use serde::Serialize;

/// One group of form fields. A row with several fields renders side by side.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Fieldset {
    /// Group heading; None renders an unlabeled group
    pub label: Option<&'static str>,
    pub rows: &'static [&'static [&'static str]],
}

/// Console registration for one entity
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityAdmin {
    pub entity: &'static str,
    /// List-view columns; empty means the string representation only
    pub list_display: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    /// Detail-form layout; empty means one field per row in model order
    pub fieldsets: &'static [Fieldset],
    /// Related entities editable inline on this entity's form
    pub inlines: &'static [&'static str],
}

const REGISTRY: &[EntityAdmin] = &[
    EntityAdmin {
        entity: "genre",
        list_display: &["name"],
        list_filter: &[],
        fieldsets: &[],
        inlines: &[],
    },
    EntityAdmin {
        entity: "author",
        list_display: &["last_name", "first_name", "date_of_birth", "date_of_death"],
        list_filter: &[],
        fieldsets: &[Fieldset {
            label: None,
            rows: &[
                &["first_name"],
                &["last_name"],
                &["date_of_birth", "date_of_death"],
            ],
        }],
        inlines: &[],
    },
    EntityAdmin {
        entity: "book",
        list_display: &["title", "author", "display_genre"],
        list_filter: &[],
        fieldsets: &[],
        inlines: &["book_instance"],
    },
    EntityAdmin {
        entity: "book_instance",
        list_display: &[],
        list_filter: &["status", "due_back"],
        fieldsets: &[
            Fieldset {
                label: None,
                rows: &[&["book"], &["imprint"], &["id"]],
            },
            Fieldset {
                label: Some("Availability"),
                rows: &[&["status"], &["due_back"]],
            },
        ],
        inlines: &[],
    },
];

/// The full console registration, one entry per managed entity
pub fn registry() -> &'static [EntityAdmin] {
    REGISTRY
}
