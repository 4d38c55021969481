// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # dexbuilder
//!
//! A concurrent, interning object graph for building Android DEX (Dalvik Executable) files.
//!
//! `dexbuilder` is the construction core that sits between whatever produces classes (a
//! compiler, an assembler, a DEX rewriter copying classes out of another file) and the binary
//! writer that lays out bytes. It deduplicates every string, type, prototype, field and method
//! reference into canonical pool entries, builds class definitions on top of them, and then
//! exposes the pools to the writer through a fixed read contract.
//!
//! ## Features
//!
//! - **Immutable model** - Plain value types for classes, members, annotations, encoded values,
//!   instructions, try blocks and debug items, ordered the way the DEX format requires
//! - **Concurrent interning** - All pools support insert-if-absent from many threads against one
//!   session; the hot keys (`"I"`, `"Ljava/lang/Object;"`) never serialize the whole builder
//! - **Bulk copy** - Interning a class rebuilds its whole graph from the session's pools, so
//!   classes taken from another file share references with everything else
//! - **Lenient mode** - Skip and record broken fields and methods instead of failing the class
//! - **Write-once slots** - Indices and offsets assigned by the writer are recorded exactly once
//!
//! ## Quick Start
//!
//! ```rust
//! use dexbuilder::prelude::*;
//!
//! let builder = DexBuilder::new();
//! let main = Method::new(
//!     "LHello;",
//!     "main",
//!     vec![MethodParameter::new("[Ljava/lang/String;")],
//!     "V",
//!     (AccessFlags::PUBLIC | AccessFlags::STATIC).bits(),
//!     AnnotationSet::new(),
//!     Some(MethodImplementation::new(
//!         1,
//!         vec![Instruction::Format10x { opcode: Opcode::ReturnVoid }],
//!         vec![],
//!         vec![],
//!     )),
//! );
//! let class = ClassDef::new(
//!     "LHello;",
//!     AccessFlags::PUBLIC.bits(),
//!     Some("Ljava/lang/Object;".to_string()),
//!     &[],
//!     Some("Hello.java".to_string()),
//!     AnnotationSet::new(),
//!     vec![],
//!     vec![main],
//! )?;
//!
//! builder.intern_class_def(&class)?;
//!
//! // The writer side
//! let classes = builder.classes();
//! for (index, class) in classes.sorted_classes().iter().enumerate() {
//!     classes.set_class_index(class, index as u32)?;
//! }
//! assert_eq!(builder.sorted_classes().len(), 1);
//! # Ok::<(), dexbuilder::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`model`] - Immutable entity model
//! - [`builder`] - Builder references, interning pools and the [`DexBuilder`] facade
//! - [`section`] - Section contracts consumed by the binary writer
//!
//! Interning is bottom-up: strings, types, type lists and prototypes, field and method
//! references, annotations and finally classes. Each builder reference carries a slot id into a
//! write-once side table where the writer later records its index or offset.
#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dexbuilder::prelude::*;
///
/// let builder = DexBuilder::with_config(BuilderConfig::lenient());
/// let ty = builder.intern_type("Ljava/lang/Object;")?;
/// assert_eq!(ty.as_str(), "Ljava/lang/Object;");
/// # Ok::<(), dexbuilder::Error>(())
/// ```
pub mod prelude;

/// The immutable entity model.
///
/// Classes, fields, methods, annotations, encoded values, references, instructions, try blocks
/// and debug items as plain values with the ordering the DEX format prescribes.
pub mod model;

/// Construction sessions, builder references and interning pools.
pub mod builder;

/// Read contracts consumed by the binary writer.
pub mod section;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dexbuilder` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// The construction session, see [`builder::DexBuilder`].
pub use builder::{BuilderConfig, DexBuilder};
