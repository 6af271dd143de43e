pub(crate) mod dynamic;
pub(crate) mod fixed;
pub(crate) mod raw;
pub(crate) mod sub_image;
