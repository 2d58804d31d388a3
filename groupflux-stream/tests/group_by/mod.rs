// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod group_by_collect_tests;
pub mod group_by_concurrency_tests;
pub mod group_by_tests;
