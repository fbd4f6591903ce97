pub mod activity;
pub mod camper;
pub mod document;
pub mod signup;
pub mod validation;

pub use activity::{Activity, ActivityUpdate, NewActivity};
pub use camper::{Camper, CamperUpdate, NewCamper};
pub use document::{
    ActivityDocument, ActivitySignupEntry, ActivitySummary, CamperDocument, CamperSignupEntry,
    CamperSummary, SignupDocument,
};
pub use signup::{NewSignup, Signup, SignupInput};
pub use validation::ValidationError;
