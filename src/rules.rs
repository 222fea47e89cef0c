pub mod equals_object;

pub use equals_object::{
    CanonicalEqualityMethods, EQUALS_OBJECT, EqualsObjectLint, ResolvedCallSite,
};
