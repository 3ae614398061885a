//! Reflex runtime object model
//!
//! This crate provides runtime type information for Rust code that needs
//! late-bound access to objects:
//! - **Types**: primitive, enum and flag type descriptors (`types` module)
//! - **Classes**: class descriptors with attributes, methods, constructors,
//!   events and slots, built with [`ClassBuilder`] (`class`, `member` modules)
//! - **Registry**: the [`ClassRegistry`] with hierarchy queries, modules and
//!   dynamic instantiation (`registry` module)
//! - **Objects**: string-keyed attribute access and method calls on live
//!   instances (`object`, `var`, `function` modules)
//! - **Events**: ordered signal/slot dispatch (`event` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use reflex_core::{ClassBuilder, ClassRegistry, Object};
//!
//! let registry = ClassRegistry::new();
//! registry.register_class(
//!     ClassBuilder::new("Calculator")
//!         .method("Add", "Add two numbers", |_: &mut Object, (a, b): (i32, i32)| a + b)
//!         .default_constructor("Create a calculator")
//!         .build()?,
//! )?;
//!
//! let mut calc = registry.create_default("Calculator")?;
//! assert_eq!(calc.call_method_str("Add", r#"Param0="2" Param1="3""#)?, "5");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod config;
pub mod error;
pub mod event;
pub mod function;
pub mod member;
pub mod object;
pub mod params;
pub mod registry;
pub mod types;
pub mod var;

pub use class::{ClassBuilder, ClassDescriptor, ClassLayout};
pub use config::RegistryOptions;
pub use error::{ConfigError, RttiError, RttiResult};
pub use event::{DynamicEvent, Event, EventHandler, HandlerId};
pub use function::{ConstructorDescriptor, DynamicFunction};
pub use member::{
    AttributeDescriptor, EventDescriptor, MemberDescriptor, MemberKind, MemberPayload, SlotDescriptor,
};
pub use object::{Object, ValueFilter};
pub use params::{ParamPack, Signature};
pub use registry::{
    global, AbstractInclusion, BaseInclusion, ClassQuery, ClassRegistry, ModuleContext, ModuleInfo,
    ModuleRegistrar, Recursion,
};
pub use types::{Color3, Color4, EnumBuilder, EnumEntry, RttiType, TypeDescriptor, TypeKind, TypeRef, Value};
