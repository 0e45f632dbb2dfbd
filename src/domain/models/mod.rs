// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod index_record;
pub mod map_candidate;
pub mod search_result;
