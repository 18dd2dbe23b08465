/// Marker for a model that is still being trained.
///
/// `LinearModel<Unfitted>` implements [`TrainableModel`](super::TrainableModel)
/// and has no prediction methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unfitted;

/// Marker for a trained model.
///
/// A `Fitted` model holds inference parameters only and implements
/// [`InferenceModel`](super::InferenceModel).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fitted;
