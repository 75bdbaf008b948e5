mod builder;

pub use builder::{build_builder_prompt, build_intent_prompt, build_refiner_prompt, build_verifier_prompt};
