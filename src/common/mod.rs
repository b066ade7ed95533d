// SPDX-License-Identifier: MIT

//! Shared data types: the row record and the timestamp model.

pub mod row;
pub mod timestamp;
