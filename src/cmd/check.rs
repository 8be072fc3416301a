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

/// Check that the course loads: every lesson parses, no item is blank or
/// duplicated, and the database opens.
pub fn check_course(directory: Option<String>) -> Fallible<()> {
    let _ = Course::new(directory, Timestamp::now())?;
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_non_existent_directory() {
        assert!(check_course(Some("./derpherp".to_string())).is_err());
    }

    #[test]
    fn test_valid_course() -> Fallible<()> {
        let dir = tempdir()?;
        write(
            dir.path().join("food.toml"),
            "[[vocabulary]]\nprompt = \"der Apfel\"\nanswer = \"the apple\"\n",
        )?;
        assert!(check_course(Some(dir.path().display().to_string())).is_ok());
        Ok(())
    }

    #[test]
    fn test_broken_lesson() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("food.toml"), "[[vocabulary")?;
        assert!(check_course(Some(dir.path().display().to_string())).is_err());
        Ok(())
    }
}
