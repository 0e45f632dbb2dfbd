// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod canonical;
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
pub mod sitemap;
