pub(crate) use super::{DenseDistanceError, DenseDistanceProvider};

mod support;
