// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod domain_frequency;
pub mod index_domain_split;
pub mod index_record;
pub mod index_url_split;
pub mod omce_signature;
