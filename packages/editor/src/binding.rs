//! # Reactive View Binding
//!
//! Attaches a view to document notifications. The callback carries no
//! payload: it only tells the view to re-derive itself from the document.
//!
//! A binding holds at most one subscription. Rebinding releases the old
//! subscription before the new one is made, so a view never hears from a
//! document it has moved away from.

use crate::{Document, Subscription};

#[derive(Default)]
pub struct ViewBinding {
    bound: Option<(Document, Subscription)>,
}

impl ViewBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `document`, replacing any previous binding
    pub fn bind<F>(&mut self, document: &Document, on_change: F)
    where
        F: Fn() + 'static,
    {
        self.unbind();
        let subscription = document.subscribe(move |_| on_change());
        self.bound = Some((document.clone(), subscription));
    }

    /// Bind when a document is available, unbind otherwise.
    /// Returns whether the binding is now active.
    pub fn bind_optional<F>(&mut self, document: Option<&Document>, on_change: F) -> bool
    where
        F: Fn() + 'static,
    {
        match document {
            Some(document) => {
                self.bind(document, on_change);
                true
            }
            None => {
                self.unbind();
                false
            }
        }
    }

    pub fn unbind(&mut self) {
        if let Some((_, subscription)) = self.bound.take() {
            subscription.unsubscribe();
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.bound.as_ref().map(|(document, _)| document)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn is_bound_to(&self, document: &Document) -> bool {
        self.document()
            .is_some_and(|bound| Document::ptr_eq(bound, document))
    }
}
