//! Checkout address creation/selection flow.
//!
//! ```text
//!  no addresses ──────────────► CreationForm ──created──► List(selected = new)
//!  addresses ──► List(selected = primary | first)
//!  List ──show_form──► CreationForm ──cancel (addresses exist)──► List
//!  List(selected) ──continue──► extra delivery info
//! ```
//!
//! The flow is kept in the session between requests and re-synced with the
//! backend's address list whenever the checkout page is rendered.

use serde::{Deserialize, Serialize};

use crate::models::Direccion;
use crate::types::DireccionId;

/// Which panel the checkout page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckoutView {
    #[default]
    CreationForm,
    List,
}

/// Errors raised by flow transitions.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Por favor selecciona una dirección")]
    NoSelection,
    #[error("La dirección seleccionada no existe")]
    UnknownAddress(DireccionId),
}

/// Events accepted by [`CheckoutFlow::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    ShowForm,
    CancelForm,
    Select(DireccionId),
    Created(Direccion),
}

/// State of the address step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    direcciones: Vec<Direccion>,
    selected: Option<DireccionId>,
    view: CheckoutView,
}

impl CheckoutFlow {
    /// Initial state for a freshly loaded address list.
    #[must_use]
    pub fn from_addresses(direcciones: Vec<Direccion>) -> Self {
        let selected = default_selection(&direcciones);
        let view = if direcciones.is_empty() {
            CheckoutView::CreationForm
        } else {
            CheckoutView::List
        };
        Self {
            direcciones,
            selected,
            view,
        }
    }

    /// Replace the address list with a fresh copy from the backend.
    ///
    /// Keeps the current selection when it still exists and the creation
    /// form when it was open; otherwise falls back to the initial state.
    #[must_use]
    pub fn sync(self, direcciones: Vec<Direccion>) -> Self {
        let keep_selection = self
            .selected
            .filter(|id| direcciones.iter().any(|d| d.id == *id));
        let keep_form = self.view == CheckoutView::CreationForm;

        let mut flow = Self::from_addresses(direcciones);
        if keep_selection.is_some() {
            flow.selected = keep_selection;
        }
        if keep_form {
            flow.view = CheckoutView::CreationForm;
        }
        flow
    }

    /// Pure reducer over [`CheckoutEvent`]s.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownAddress`] when selecting an id that is
    /// not in the list. The flow is returned unchanged alongside the error.
    pub fn apply(mut self, event: CheckoutEvent) -> Result<Self, (Self, CheckoutError)> {
        match event {
            CheckoutEvent::ShowForm => self.show_form(),
            CheckoutEvent::CancelForm => self.cancel_form(),
            CheckoutEvent::Select(id) => {
                if let Err(e) = self.select(id) {
                    return Err((self, e));
                }
            }
            CheckoutEvent::Created(direccion) => self.address_created(direccion),
        }
        Ok(self)
    }

    pub fn show_form(&mut self) {
        self.view = CheckoutView::CreationForm;
    }

    /// Close the creation form. Ignored while there are no addresses.
    pub fn cancel_form(&mut self) {
        if self.can_cancel() {
            self.view = CheckoutView::List;
        }
    }

    /// Select an address from the list.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownAddress`] if `id` is not in the list.
    pub fn select(&mut self, id: DireccionId) -> Result<(), CheckoutError> {
        if !self.direcciones.iter().any(|d| d.id == id) {
            return Err(CheckoutError::UnknownAddress(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// A new address was created: append it, select it, collapse the form.
    pub fn address_created(&mut self, direccion: Direccion) {
        if direccion.is_primary {
            for d in &mut self.direcciones {
                d.is_primary = false;
            }
        }
        let id = direccion.id;
        self.direcciones.retain(|d| d.id != id);
        self.direcciones.push(direccion);
        self.selected = Some(id);
        self.view = CheckoutView::List;
    }

    /// The address to continue with.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoSelection`] when nothing is selected.
    pub fn continue_with(&self) -> Result<DireccionId, CheckoutError> {
        self.selected.ok_or(CheckoutError::NoSelection)
    }

    /// URL of the extra delivery info step for the selected address.
    ///
    /// # Errors
    ///
    /// Same as [`CheckoutFlow::continue_with`].
    pub fn continue_url(&self) -> Result<String, CheckoutError> {
        self.continue_with()
            .map(|id| format!("/addresses/extra-info-details?direccion_id={id}"))
    }

    #[must_use]
    pub fn direcciones(&self) -> &[Direccion] {
        &self.direcciones
    }

    #[must_use]
    pub const fn selected(&self) -> Option<DireccionId> {
        self.selected
    }

    #[must_use]
    pub fn selected_direccion(&self) -> Option<&Direccion> {
        let id = self.selected?;
        self.direcciones.iter().find(|d| d.id == id)
    }

    #[must_use]
    pub fn is_selected(&self, id: &DireccionId) -> bool {
        self.selected == Some(*id)
    }

    #[must_use]
    pub const fn view(&self) -> CheckoutView {
        self.view
    }

    #[must_use]
    pub fn showing_form(&self) -> bool {
        self.view == CheckoutView::CreationForm
    }

    /// "Cancelar" is only offered when there is a list to go back to.
    #[must_use]
    pub fn can_cancel(&self) -> bool {
        !self.direcciones.is_empty()
    }

    #[must_use]
    pub const fn can_continue(&self) -> bool {
        self.selected.is_some()
    }
}

fn default_selection(direcciones: &[Direccion]) -> Option<DireccionId> {
    direcciones
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| direcciones.first())
        .map(|d| d.id)
}
