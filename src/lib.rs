/*!
# Medical Calculator Admin

An administrative service for authoring and browsing medical calculators:
parameterised formulas with units, descriptions and supporting evidence,
kept in a document store.

## Overview

Authors create a calculator (name, descriptions, parameters with units, a
LaTeX-like formula, supporting text), list/search/filter existing
calculators, and edit or delete them. While authoring, the formula can be
tested against sample values and previewed as Swift and Java code for the
mobile developers who port it.

## Architecture

### Formula pipeline
- **Conversion Table** - directed `(from, to)` unit scale factors
- **Transformer** - regex rewrites of the restricted LaTeX grammar
  (`\frac`, `^{2}`, `\sqrt`, `\times`, `\div`) into an evaluable expression
- **Evaluator** - substitutes converted test values and evaluates the result
  with a small arithmetic parser (no runtime evaluation of arbitrary text)
- **Previews** - Swift and Java renderings of the same formula

### Shell
- **Store** - create/get/merge-update/delete/list over the `Calculators`
  collection, backed by a JSON file or memory
- **List view** - free-text search plus popular/recently-added filters
- **Editor** - one immutable state value and an `update(state, event)` step

## Modules

- **units**: conversion table and the unit picker catalog
- **transform**: evaluable-expression rewrite and the formula palette
- **expression**: arithmetic tokenizer and evaluator
- **evaluator**: parameter substitution and evaluation
- **preview**: Swift / Java code previews
- **calculator**: record, parameter and test value types
- **store**: document store trait and implementations
- **listing**: search and filter
- **editor**: form state, validation and submit
- **config**: environment configuration
- **app**: HTTP routing (feature `web`)

## REST API Endpoints

- `GET /api/calculators?search=&filter=` - Lists calculators
- `POST /api/calculators` - Creates a calculator
- `GET|PUT|DELETE /api/calculators/{id}` - Reads, merges or deletes one
- `POST /api/formula/evaluate` - Evaluates a formula with test values
- `POST /api/formula/preview` - Renders evaluable, Swift and Java forms
- `GET /api/formula/palette` - Insertable math components and operators
- `GET /api/units?q=` - Searches the unit catalog
*/

pub mod calculator;
pub mod config;
pub mod editor;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod listing;
pub mod preview;
pub mod store;
pub mod transform;
pub mod units;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the everyday types to make them easier to use
pub use calculator::*;
pub use error::*;
pub use evaluator::{Evaluation, ParamValues, evaluate_formula};
pub use store::{CalculatorStore, JsonFileStore, MemoryStore};
pub use units::ConversionTable;
