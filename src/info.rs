//! The document information view.
//!
//! An [`InfoView`] projects the trailer's Info dictionary onto the recognised
//! property set. Setters raise the dirty flag; a dirty view is written back
//! into the update section when the session commits. Keys outside the
//! recognised set are left untouched by the write-back.

use crate::properties::DocumentProperties;

/// Typed, mutable projection of the document information dictionary.
#[derive(Debug)]
pub struct InfoView {
    properties: DocumentProperties,
    dirty: bool,
}

impl InfoView {
    pub(crate) fn new(properties: DocumentProperties) -> Self {
        Self {
            properties,
            dirty: false,
        }
    }

    /// The property record in its current in-memory state.
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Whether any setter ran since construction.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// /Title value.
    pub fn title(&self) -> Option<&str> {
        self.properties.title.as_deref()
    }

    /// Set /Title.
    pub fn set_title(&mut self, value: impl Into<String>) {
        self.properties.title = Some(value.into());
        self.dirty = true;
    }

    /// /Author value.
    pub fn author(&self) -> Option<&str> {
        self.properties.author.as_deref()
    }

    /// Set /Author.
    pub fn set_author(&mut self, value: impl Into<String>) {
        self.properties.author = Some(value.into());
        self.dirty = true;
    }

    /// /Subject value.
    pub fn subject(&self) -> Option<&str> {
        self.properties.subject.as_deref()
    }

    /// Set /Subject.
    pub fn set_subject(&mut self, value: impl Into<String>) {
        self.properties.subject = Some(value.into());
        self.dirty = true;
    }

    /// /Keywords value.
    pub fn keywords(&self) -> Option<&str> {
        self.properties.keywords.as_deref()
    }

    /// Set /Keywords.
    pub fn set_keywords(&mut self, value: impl Into<String>) {
        self.properties.keywords = Some(value.into());
        self.dirty = true;
    }

    /// /Creator value.
    pub fn creator(&self) -> Option<&str> {
        self.properties.creator.as_deref()
    }

    /// Set /Creator.
    pub fn set_creator(&mut self, value: impl Into<String>) {
        self.properties.creator = Some(value.into());
        self.dirty = true;
    }

    /// /Producer value.
    pub fn producer(&self) -> Option<&str> {
        self.properties.producer.as_deref()
    }

    /// Set /Producer.
    pub fn set_producer(&mut self, value: impl Into<String>) {
        self.properties.producer = Some(value.into());
        self.dirty = true;
    }

    /// /CreationDate value (PDF date string).
    pub fn creation_date(&self) -> Option<&str> {
        self.properties.creation_date.as_deref()
    }

    /// Set /CreationDate (PDF date string).
    pub fn set_creation_date(&mut self, value: impl Into<String>) {
        self.properties.creation_date = Some(value.into());
        self.dirty = true;
    }

    /// /ModDate value (PDF date string).
    pub fn mod_date(&self) -> Option<&str> {
        self.properties.mod_date.as_deref()
    }

    /// Set /ModDate (PDF date string).
    pub fn set_mod_date(&mut self, value: impl Into<String>) {
        self.properties.mod_date = Some(value.into());
        self.dirty = true;
    }
}
