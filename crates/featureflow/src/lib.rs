//! Compile Gherkin feature files into executable scenarios.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`parser`] reads a feature file into the typed [`model`], classifying
//!    grammar failures into [`parser::ParseErrorKind`]s.
//! 2. [`outline`] expands scenario outlines into one concrete scenario per
//!    example row and collects them with their backgrounds.
//! 3. [`registry`] matches step text against registered definitions and
//!    converts the captured arguments.
//! 4. [`execution`] runs a concrete scenario step by step against a
//!    registry.
//!
//! # Examples
//!
//! ```
//! use featureflow::execution::ScenarioRunner;
//! use featureflow::outline::compile_feature;
//! use featureflow::parser::FeatureParser;
//! use featureflow::registry::{StepPattern, StepRegistryBuilder};
//! use featureflow::StepKeyword;
//!
//! let source = "Feature: Basket\n  Scenario: Adding\n    Given 2 apples\n";
//! let document = FeatureParser::default()
//!     .parse_str(source, "basket.feature")
//!     .expect("feature parses");
//!
//! let mut builder = StepRegistryBuilder::new();
//! builder
//!     .register(
//!         StepKeyword::Given,
//!         StepPattern::format("{count:u32} apples").expect("pattern compiles"),
//!         |args| {
//!             assert_eq!(args.get::<u32>("count")?, &2);
//!             Ok(())
//!         },
//!     )
//!     .expect("Given is a primary keyword");
//! let runner = ScenarioRunner::new(builder.build());
//!
//! for case in compile_feature(&document.feature) {
//!     let outcome = runner.run(&case.scenario.scenario, case.background.as_ref());
//!     assert!(outcome.passed());
//! }
//! ```

pub mod config;
pub mod dump;
pub mod execution;
pub mod model;
pub mod outline;
mod panic;
pub mod parser;
pub mod registry;

pub use featureflow_patterns::StepKeyword;
pub use inventory::{iter, submit};
pub use panic::panic_message;
