pub(crate) mod crop;
pub(crate) mod grayscale;
