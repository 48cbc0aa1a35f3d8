use crate::layers::marker::{Category, ContactDetails, MarkerId, MarkerLayer, MarkerPoint};
use serde::Serialize;

/// Which marker's popup is open, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    None,
    Selected(MarkerId),
}

/// What the user asked for from an open popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    ViewDetails,
    RequestPickup,
}

/// Payload handed to the host when the user leaves the map for a marker.
///
/// Built only from the marker's own fields. Contact details are passed
/// through when the data has them and are `None` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationRequest {
    pub action: NavigationAction,
    pub marker_id: MarkerId,
    pub name: String,
    pub category: Category,
    pub waste_type: String,
    pub amount: String,
    pub distance: String,
    pub updated_at: String,
    pub contact: Option<ContactDetails>,
}

impl NavigationRequest {
    pub fn for_marker(action: NavigationAction, marker: &MarkerPoint) -> Self {
        let metadata = &marker.metadata;
        Self {
            action,
            marker_id: marker.id.clone(),
            name: metadata.name.clone(),
            category: marker.category,
            waste_type: metadata.waste_type.clone(),
            amount: metadata.amount.clone(),
            distance: metadata.distance.clone(),
            updated_at: metadata.updated_at.clone(),
            contact: metadata.contact.clone(),
        }
    }
}

/// Single-slot popup selection.
///
/// At most one marker is selected, and only a marker that is currently
/// visible in the layer can stay selected.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> Option<&MarkerId> {
        match &self.state {
            SelectionState::None => None,
            SelectionState::Selected(id) => Some(id),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SelectionState::Selected(_))
    }

    /// Opens the popup for `id`, replacing any open one.
    ///
    /// Taps on markers that are not visible are ignored. Returns whether the
    /// selection changed.
    pub fn tap(&mut self, id: &MarkerId, layer: &MarkerLayer) -> bool {
        if !layer.is_visible(id) {
            log::warn!("ignoring tap on marker {id}: not visible");
            return false;
        }
        if self.selected() == Some(id) {
            return false;
        }
        log::debug!("selected marker {id}");
        self.state = SelectionState::Selected(id.clone());
        true
    }

    /// Closes the popup. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        if let SelectionState::Selected(id) = std::mem::take(&mut self.state) {
            log::debug!("closed popup for marker {id}");
            true
        } else {
            false
        }
    }

    /// Clears the selection if its marker left the visible set.
    pub fn retain_visible(&mut self, layer: &MarkerLayer) -> bool {
        match self.selected() {
            Some(id) if !layer.is_visible(id) => {
                log::debug!("selected marker {id} no longer visible");
                self.state = SelectionState::None;
                true
            }
            _ => false,
        }
    }

    pub fn view_details(&mut self, layer: &MarkerLayer) -> Option<NavigationRequest> {
        self.navigate(NavigationAction::ViewDetails, layer)
    }

    pub fn request_pickup(&mut self, layer: &MarkerLayer) -> Option<NavigationRequest> {
        self.navigate(NavigationAction::RequestPickup, layer)
    }

    /// Builds the request for the open marker and clears the selection.
    fn navigate(
        &mut self,
        action: NavigationAction,
        layer: &MarkerLayer,
    ) -> Option<NavigationRequest> {
        let SelectionState::Selected(id) = std::mem::take(&mut self.state) else {
            return None;
        };
        let request = layer
            .get(&id)
            .map(|marker| NavigationRequest::for_marker(action, marker));
        if request.is_none() {
            log::warn!("selected marker {id} missing from layer");
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::NormalizedPosition;
    use crate::layers::marker::{CategoryFilter, MarkerMetadata};

    fn marker(id: &str, category: Category) -> MarkerPoint {
        MarkerPoint::new(
            id,
            NormalizedPosition::new(10.0, 10.0),
            category,
            MarkerMetadata {
                name: format!("Site {id}"),
                waste_type: "Bread".to_string(),
                amount: "4 kg".to_string(),
                distance: "300 m".to_string(),
                updated_at: "today".to_string(),
                ..Default::default()
            },
        )
    }

    fn layer() -> MarkerLayer {
        MarkerLayer::new(vec![
            marker("a", Category::Collection),
            marker("b", Category::Distribution),
        ])
        .expect("unique ids")
    }

    #[test]
    fn test_tap_switches_directly() {
        let layer = layer();
        let mut selection = SelectionController::new();
        let a = MarkerId::from("a");
        let b = MarkerId::from("b");

        assert!(selection.tap(&a, &layer));
        assert!(selection.tap(&b, &layer));
        assert_eq!(selection.state(), &SelectionState::Selected(b.clone()));
        assert!(!selection.tap(&b, &layer));

        assert!(selection.close());
        assert!(!selection.close());
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_unknown_or_hidden_marker_is_not_selected() {
        let mut layer = layer();
        let mut selection = SelectionController::new();
        assert!(!selection.tap(&MarkerId::from("zzz"), &layer));

        layer.set_filter(CategoryFilter::Only(Category::Distribution));
        assert!(!selection.tap(&MarkerId::from("a"), &layer));
        assert!(!selection.is_open());
    }

    #[test]
    fn test_filter_clears_hidden_selection() {
        let mut layer = layer();
        let mut selection = SelectionController::new();
        selection.tap(&MarkerId::from("a"), &layer);

        layer.set_filter(CategoryFilter::Only(Category::Collection));
        assert!(!selection.retain_visible(&layer));
        assert!(selection.is_open());

        layer.set_filter(CategoryFilter::Only(Category::Distribution));
        assert!(selection.retain_visible(&layer));
        assert_eq!(selection.state(), &SelectionState::None);
    }

    #[test]
    fn test_view_details_emits_request_and_clears() {
        let layer = layer();
        let mut selection = SelectionController::new();
        assert_eq!(selection.view_details(&layer), None);

        selection.tap(&MarkerId::from("b"), &layer);
        let request = selection.view_details(&layer).expect("request built");
        assert_eq!(request.action, NavigationAction::ViewDetails);
        assert_eq!(request.name, "Site b");
        assert_eq!(request.category, Category::Distribution);
        assert_eq!(request.contact, None);
        assert!(!selection.is_open());
    }

    #[test]
    fn test_request_pickup() {
        let layer = layer();
        let mut selection = SelectionController::new();
        selection.tap(&MarkerId::from("a"), &layer);
        let request = selection.request_pickup(&layer).expect("request built");
        assert_eq!(request.action, NavigationAction::RequestPickup);
        assert_eq!(request.waste_type, "Bread");

        let json = serde_json::to_value(&request).expect("serializable");
        assert_eq!(json["action"], "request_pickup");
        assert_eq!(json["marker_id"], "a");
    }
}
