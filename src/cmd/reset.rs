// Copyright 2025 Fernando Borretti
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

use crate::course::Course;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

/// Restart an item's schedule from scratch. The item is named by its hash,
/// or any unique prefix of it, as shown by the due listing.
pub fn reset_item(directory: Option<String>, prefix: &str) -> Fallible<()> {
    let now = Timestamp::now();
    let mut course = Course::new(directory, now)?;
    let item = course.find_item(prefix)?;
    let hash = item.hash();
    println!("Resetting '{}' ({}).", item.prompt(), hash.short_hex());
    course.db.reset_state(hash, now)?;
    Ok(())
}
