//! Listing-creation form controller
//!
//! Lifecycle:
//!
//! ```text
//! Editing --submit--> (validate) --errors--> EditingWithErrors
//!                               \--ok-----> Submitting --stored--> Submitted
//!                                                      \--failed--> EditingWithSubmitError
//! ```
//!
//! Submission is split into [`ListingFormController::begin_submit`] and
//! [`ListingFormController::finish_submit`] so the form stays editable while
//! the store call is pending. [`ListingFormController::submit`] runs both
//! around a single store call. A ticket only finishes the attempt of the
//! form that issued it.

use crate::error::{FormError, SubmitError};
use crate::form::preview::{ImageFile, PreviewProvider};
use crate::form::state::{
    FieldErrors, FieldPath, FormPhase, ImageAttachment, ListField, ListingDraft, ListingFormState,
};
use crate::form::validation;
use crate::models::{Listing, ListingKind, NewListing};
use crate::session::SessionContext;
use crate::store::ListingStore;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Proof that a submit was started. Must be passed back to
/// [`ListingFormController::finish_submit`] once the store call completes.
#[derive(Debug)]
pub struct SubmitTicket {
    form: Uuid,
    attempt: u64,
    payload: NewListing,
}

impl SubmitTicket {
    /// The payload to hand to the store
    pub fn payload(&self) -> &NewListing {
        &self.payload
    }
}

/// Owns one form's state and the previews of its attached images.
///
/// Dropping the controller releases every preview still held.
pub struct ListingFormController<P: PreviewProvider> {
    id: Uuid,
    /// Number of submits started; the pending ticket carries the latest
    attempts: u64,
    state: ListingFormState,
    previews: P,
}

impl<P: PreviewProvider> ListingFormController<P> {
    pub fn new(kind: ListingKind, previews: P) -> Self {
        debug!("Opening {} listing form", kind);
        Self {
            id: Uuid::new_v4(),
            attempts: 0,
            state: ListingFormState::new(kind),
            previews,
        }
    }

    pub fn state(&self) -> &ListingFormState {
        &self.state
    }

    pub fn kind(&self) -> ListingKind {
        self.state.kind
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.state.draft
    }

    /// Errors from the last validation
    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn phase(&self) -> FormPhase {
        self.state.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.state.submitting
    }

    /// Generic message from the last failed store call
    pub fn submit_error(&self) -> Option<&str> {
        self.state.submit_error.as_deref()
    }

    pub fn set_field(
        &mut self,
        path: FieldPath,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.state.draft.set(path, value.into())
    }

    /// Append a blank feature row
    pub fn add_feature(&mut self) {
        self.state.draft.push(ListField::Features, String::new());
    }

    /// Append to a list field; false when a crop was blank or already present
    pub fn add_list_item(&mut self, field: ListField, value: impl Into<String>) -> bool {
        self.state.draft.push(field, value.into())
    }

    pub fn remove_list_item(
        &mut self,
        field: ListField,
        index: usize,
    ) -> Result<String, FormError> {
        self.state.draft.remove(field, index)
    }

    /// Attach a file, creating exactly one preview for it
    pub fn add_image(&mut self, file: ImageFile) {
        let preview = self.previews.create_preview(&file);
        self.state.images.push(ImageAttachment { file, preview });
    }

    pub fn add_images(&mut self, files: impl IntoIterator<Item = ImageFile>) {
        for file in files {
            self.add_image(file);
        }
    }

    /// Detach the image at `index` and release its preview
    pub fn remove_image(&mut self, index: usize) -> Result<ImageFile, FormError> {
        let len = self.state.images.len();
        if index >= len {
            return Err(FormError::ImageOutOfRange { index, len });
        }

        let attachment = self.state.images.remove(index);
        self.previews.release_preview(attachment.preview);
        Ok(attachment.file)
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageFile> {
        self.state.images.iter().map(|a| &a.file)
    }

    /// Preview references in image order
    pub fn preview_refs(&self) -> Vec<&str> {
        self.state.images.iter().map(|a| a.preview.as_str()).collect()
    }

    /// Validate the draft and record the result on the form
    pub fn validate(&mut self) -> FieldErrors {
        let errors =
            validation::validate(self.state.kind, &self.state.draft, self.state.images.len());

        if matches!(
            self.state.phase,
            FormPhase::Editing | FormPhase::EditingWithErrors | FormPhase::EditingWithSubmitError
        ) {
            self.state.phase = if errors.is_empty() {
                FormPhase::Editing
            } else {
                FormPhase::EditingWithErrors
            };
        }

        self.state.errors = errors.clone();
        errors
    }

    /// Validate and, if clean, enter `Submitting` and return the payload to store.
    ///
    /// A second call before [`finish_submit`](Self::finish_submit) is rejected.
    pub fn begin_submit(&mut self, session: &SessionContext) -> Result<SubmitTicket, SubmitError> {
        match self.state.phase {
            FormPhase::Submitted => return Err(SubmitError::AlreadySubmitted),
            FormPhase::Submitting => {
                warn!("Rejecting submit while another is in progress");
                return Err(SubmitError::AlreadySubmitting);
            }
            _ => {}
        }

        let errors = self.validate();
        if !errors.is_empty() {
            debug!("Submit blocked by {} field error(s)", errors.len());
            return Err(SubmitError::Validation(errors));
        }

        let owner = session
            .identity()
            .map(|identity| identity.as_owner())
            .ok_or(SubmitError::NotSignedIn)?;

        let images = self.state.images.iter().map(|a| a.file.name.clone()).collect();
        let payload = validation::normalize(self.state.kind, &self.state.draft, images, owner);

        self.attempts += 1;
        self.state.submitting = true;
        self.state.submit_error = None;
        self.state.phase = FormPhase::Submitting;
        info!("Submitting {} listing '{}'", self.state.kind, payload.title);

        Ok(SubmitTicket {
            form: self.id,
            attempt: self.attempts,
            payload,
        })
    }

    /// Record the outcome of the store call started by `ticket`.
    ///
    /// A ticket from another form or an earlier attempt is rejected with
    /// [`SubmitError::TicketMismatch`] and leaves the form untouched.
    /// Otherwise the form always leaves `Submitting`.
    pub fn finish_submit(
        &mut self,
        ticket: &SubmitTicket,
        outcome: anyhow::Result<Listing>,
    ) -> Result<Listing, SubmitError> {
        let pending = self.state.phase == FormPhase::Submitting
            && ticket.form == self.id
            && ticket.attempt == self.attempts;
        if !pending {
            warn!("Ignoring submit outcome for a ticket this form is not waiting on");
            return Err(SubmitError::TicketMismatch);
        }

        self.state.submitting = false;

        match outcome {
            Ok(listing) => {
                info!("Listing {} created", listing.id);
                self.state.phase = FormPhase::Submitted;
                // The form is done with its previews once the listing exists
                self.release_all();
                Ok(listing)
            }
            Err(e) => {
                warn!("Failed to create listing: {:#}", e);
                let error = SubmitError::Persistence {
                    reason: format!("{:#}", e),
                };
                self.state.phase = FormPhase::EditingWithSubmitError;
                self.state.submit_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Validate, store once, and record the outcome
    pub async fn submit(
        &mut self,
        store: &dyn ListingStore,
        session: &SessionContext,
    ) -> Result<Listing, SubmitError> {
        let ticket = self.begin_submit(session)?;
        let outcome = store.create_listing(ticket.payload()).await;
        self.finish_submit(&ticket, outcome)
    }

    /// Tear the form down, releasing all previews
    pub fn discard(mut self) {
        debug!("Discarding {} listing form", self.state.kind);
        self.release_all();
    }

    fn release_all(&mut self) {
        for attachment in self.state.images.drain(..) {
            self.previews.release_preview(attachment.preview);
        }
    }
}

impl<P: PreviewProvider> Drop for ListingFormController<P> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::preview::LocalPreviewRegistry;
    use crate::form::state::{DateBound, FormField, ScalarField};
    use crate::models::{ListingDetails, ListingId};
    use crate::session::Identity;
    use crate::store::MemoryListingStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    type Form = ListingFormController<LocalPreviewRegistry>;

    fn session() -> SessionContext {
        SessionContext::signed_in(Identity::new("owner-9", "Lakshmi"))
    }

    fn scalar(form: &mut Form, field: ScalarField, value: &str) {
        form.set_field(FieldPath::Scalar(field), value).unwrap();
    }

    fn filled_equipment_form(registry: &LocalPreviewRegistry) -> Form {
        let mut form = ListingFormController::new(ListingKind::Equipment, registry.clone());
        scalar(&mut form, ScalarField::Title, "Kubota Harvester");
        scalar(&mut form, ScalarField::Description, "Combine harvester");
        scalar(&mut form, ScalarField::Location, "Guntur");
        scalar(&mut form, ScalarField::Price, "1");
        form.add_image(ImageFile::new("harvester.jpg"));
        form
    }

    fn filled_land_form(registry: &LocalPreviewRegistry) -> Form {
        let mut form = ListingFormController::new(ListingKind::Land, registry.clone());
        for (field, value) in [
            (ScalarField::Title, "Canal-fed plot"),
            (ScalarField::Description, "Level field"),
            (ScalarField::Location, "Karnal"),
            (ScalarField::Price, "2500"),
            (ScalarField::State, "Haryana"),
            (ScalarField::Area, "6.5"),
            (ScalarField::SoilType, "Alluvial Soil"),
            (ScalarField::WaterSource, "Canal"),
        ] {
            scalar(&mut form, field, value);
        }
        form.add_image(ImageFile::new("plot.jpg"));
        form
    }

    /// What a store would hand back for the ticket's payload
    fn stored(ticket: &SubmitTicket, id: &str) -> anyhow::Result<Listing> {
        Ok(ticket
            .payload()
            .clone()
            .into_listing(ListingId::new(id), Utc::now()))
    }

    /// Store that always fails and counts calls
    #[derive(Default)]
    struct FailingStore {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ListingStore for FailingStore {
        async fn create_listing(&self, _listing: &NewListing) -> anyhow::Result<Listing> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(anyhow!("connection reset"))
        }

        async fn list_listings(&self, _kind: Option<ListingKind>) -> anyhow::Result<Vec<Listing>> {
            Ok(Vec::new())
        }

        async fn get_listing(&self, _id: &ListingId) -> anyhow::Result<Option<Listing>> {
            Ok(None)
        }

        fn source_name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn zero_price_fails_validation() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);
        scalar(&mut form, ScalarField::Price, "0");

        let errors = form.validate();
        assert!(errors.contains(FormField::Price));
        assert_eq!(form.phase(), FormPhase::EditingWithErrors);
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn minimal_valid_form_validates_clean() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);
        assert!(form.validate().is_empty());
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn duplicate_crop_is_ignored() {
        let mut form = ListingFormController::new(ListingKind::Land, LocalPreviewRegistry::new());
        assert!(form.add_list_item(ListField::Crops, "Rice"));
        assert!(!form.add_list_item(ListField::Crops, "Rice"));
        assert_eq!(form.draft().crops, vec!["Rice".to_string()]);
    }

    #[test]
    fn removing_middle_image_releases_only_its_preview() {
        let registry = LocalPreviewRegistry::new();
        let mut form = ListingFormController::new(ListingKind::Equipment, registry.clone());
        form.add_images([
            ImageFile::new("front.jpg"),
            ImageFile::new("side.jpg"),
            ImageFile::new("engine.jpg"),
        ]);
        let before: Vec<String> = form.preview_refs().iter().map(|r| r.to_string()).collect();
        assert_eq!(before.len(), 3);

        let removed = form.remove_image(1).unwrap();
        assert_eq!(removed.name, "side.jpg");
        assert_eq!(registry.released(), vec![before[1].clone()]);

        let names: Vec<&str> = form.images().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["front.jpg", "engine.jpg"]);
        assert_eq!(form.preview_refs(), vec![before[0].as_str(), before[2].as_str()]);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn remove_image_out_of_range() {
        let mut form =
            ListingFormController::new(ListingKind::Equipment, LocalPreviewRegistry::new());
        form.add_image(ImageFile::new("a.jpg"));
        assert_eq!(form.remove_image(3), Err(FormError::ImageOutOfRange { index: 3, len: 1 }));
    }

    #[test]
    fn discard_and_drop_release_every_preview() {
        let registry = LocalPreviewRegistry::new();
        let mut form = ListingFormController::new(ListingKind::Land, registry.clone());
        form.add_images([ImageFile::new("a.jpg"), ImageFile::new("b.jpg")]);
        form.discard();
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.released().len(), 2);

        let other = LocalPreviewRegistry::new();
        {
            let mut form = ListingFormController::new(ListingKind::Land, other.clone());
            form.add_image(ImageFile::new("c.jpg"));
        }
        assert_eq!(other.live_count(), 0);
    }

    #[test]
    fn nested_availability_edit_keeps_other_date() {
        let mut form =
            ListingFormController::new(ListingKind::Equipment, LocalPreviewRegistry::new());
        let start = FieldPath::Availability(DateBound::Start);
        let end = FieldPath::Availability(DateBound::End);
        form.set_field(start, "2024-05-01").unwrap();
        form.set_field(end, "2024-05-31").unwrap();
        form.set_field(end, "2024-06-30").unwrap();
        assert_eq!(form.draft().availability.start, "2024-05-01");
        assert_eq!(form.draft().availability.end, "2024-06-30");
    }

    #[tokio::test]
    async fn invalid_submit_has_no_side_effects() {
        let registry = LocalPreviewRegistry::new();
        let store = MemoryListingStore::new();
        let mut form = ListingFormController::new(ListingKind::Land, registry.clone());

        let err = form.submit(&store, &session()).await.unwrap_err();
        let errors = err.field_errors().expect("validation failure");
        assert!(errors.contains(FormField::Title));
        assert!(errors.contains(FormField::Images));
        assert_eq!(store.len().await, 0);
        assert!(!form.is_submitting());
        assert_eq!(form.phase(), FormPhase::EditingWithErrors);
    }

    #[tokio::test]
    async fn successful_submit_stores_and_releases_previews() {
        let registry = LocalPreviewRegistry::new();
        let store = MemoryListingStore::new();
        let mut form = filled_land_form(&registry);
        form.add_list_item(ListField::Crops, "Wheat");

        let listing = form.submit(&store, &session()).await.unwrap();
        assert_eq!(listing.title, "Canal-fed plot");
        assert_eq!(listing.owner.id, "owner-9");
        assert_eq!(listing.images, vec!["plot.jpg".to_string()]);
        match &listing.details {
            ListingDetails::Land(land) => {
                assert_eq!(land.area, 6.5);
                assert_eq!(land.crops, vec!["Wheat".to_string()]);
            }
            ListingDetails::Equipment(_) => panic!("expected land details"),
        }

        // The returned listing is exactly what was saved, timestamp included
        let saved = store.get_listing(&listing.id).await.unwrap();
        assert_eq!(saved, Some(listing));

        assert_eq!(store.len().await, 1);
        assert_eq!(form.phase(), FormPhase::Submitted);
        assert!(!form.is_submitting());
        assert_eq!(registry.live_count(), 0);

        let again = form.submit(&store, &session()).await.unwrap_err();
        assert_eq!(again, SubmitError::AlreadySubmitted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn store_failure_is_one_generic_error() {
        let registry = LocalPreviewRegistry::new();
        let store = FailingStore::default();
        let mut form = filled_equipment_form(&registry);

        let err = form.submit(&store, &session()).await.unwrap_err();
        assert!(matches!(err, SubmitError::Persistence { .. }));
        assert_eq!(err.to_string(), "Failed to create listing. Please try again.");
        assert_eq!(store.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        assert!(!form.is_submitting());
        assert_eq!(form.phase(), FormPhase::EditingWithSubmitError);
        assert_eq!(form.submit_error(), Some("Failed to create listing. Please try again."));
        assert!(form.errors().is_empty());
        // Previews stay with the form for a retry
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);

        let ticket = form.begin_submit(&session()).unwrap();
        assert!(form.is_submitting());

        // Still editable while the store call is pending
        scalar(&mut form, ScalarField::Title, "Kubota DC-68G");
        assert_eq!(form.begin_submit(&session()).unwrap_err(), SubmitError::AlreadySubmitting);

        let listing = form.finish_submit(&ticket, stored(&ticket, "new-1")).unwrap();
        assert_eq!(listing.id, ListingId::new("new-1"));
        // The in-flight payload was captured at submit time
        assert_eq!(listing.title, "Kubota Harvester");
        assert!(!form.is_submitting());
    }

    #[test]
    fn ticket_from_another_form_is_rejected() {
        let registry = LocalPreviewRegistry::new();
        let mut first = filled_equipment_form(&registry);
        let mut second = filled_land_form(&registry);

        let ticket = first.begin_submit(&session()).unwrap();
        let err = second.finish_submit(&ticket, stored(&ticket, "x")).unwrap_err();
        assert_eq!(err, SubmitError::TicketMismatch);

        // The other form is untouched
        assert_eq!(second.phase(), FormPhase::Editing);
        assert!(!second.is_submitting());
        assert_eq!(registry.live_count(), 2);

        // The issuing form can still finish its own attempt
        let listing = first.finish_submit(&ticket, stored(&ticket, "eq-1")).unwrap();
        assert_eq!(listing.title, "Kubota Harvester");
        assert_eq!(first.phase(), FormPhase::Submitted);
        assert!(!first.is_submitting());
    }

    #[test]
    fn finished_or_stale_ticket_is_rejected() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);

        let failed = form.begin_submit(&session()).unwrap();
        assert!(form.finish_submit(&failed, Err(anyhow!("timeout"))).is_err());
        assert_eq!(
            form.finish_submit(&failed, stored(&failed, "late")).unwrap_err(),
            SubmitError::TicketMismatch
        );
        assert_eq!(form.phase(), FormPhase::EditingWithSubmitError);

        let retry = form.begin_submit(&session()).unwrap();
        assert_eq!(
            form.finish_submit(&failed, stored(&failed, "late")).unwrap_err(),
            SubmitError::TicketMismatch
        );
        assert!(form.is_submitting());

        let listing = form.finish_submit(&retry, stored(&retry, "eq-2")).unwrap();
        assert_eq!(listing.id, ListingId::new("eq-2"));
        assert!(!form.is_submitting());
    }

    #[test]
    fn submit_requires_identity() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);
        assert_eq!(
            form.begin_submit(&SessionContext::anonymous()).unwrap_err(),
            SubmitError::NotSignedIn
        );
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn retry_after_failure_can_succeed() {
        let registry = LocalPreviewRegistry::new();
        let mut form = filled_equipment_form(&registry);

        assert!(form.submit(&FailingStore::default(), &session()).await.is_err());
        let store = MemoryListingStore::new();
        let listing = form.submit(&store, &session()).await.unwrap();
        assert_eq!(listing.title, "Kubota Harvester");
        assert!(form.submit_error().is_none());
    }
}
