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

use crate::scheduler::Quality;

/// Grade a typed vocabulary answer. Comparison ignores surrounding
/// whitespace and letter case; anything else is a miss, and a miss is
/// always a blackout rather than a partial lapse.
pub fn grade_answer(expected: &str, given: &str) -> Quality {
    let expected = expected.trim().to_lowercase();
    let given = given.trim().to_lowercase();
    if expected == given {
        Quality::GOOD
    } else {
        Quality::BLACKOUT
    }
}

/// A learner's own judgement of a grammar review, offered as four buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SelfRating {
    Forgot,
    Hard,
    Good,
    Easy,
}

impl SelfRating {
    pub fn quality(self) -> Quality {
        match self {
            SelfRating::Forgot => Quality::BLACKOUT,
            SelfRating::Hard => Quality::HARD,
            SelfRating::Good => Quality::GOOD,
            SelfRating::Easy => Quality::EASY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answer() {
        assert_eq!(grade_answer("der Apfel", "der Apfel"), Quality::GOOD);
    }

    #[test]
    fn test_case_and_whitespace_are_forgiven() {
        assert_eq!(grade_answer("der Apfel", "  DER APFEL "), Quality::GOOD);
        assert_eq!(grade_answer("über", "ÜBER"), Quality::GOOD);
    }

    #[test]
    fn test_wrong_answer_is_a_blackout() {
        assert_eq!(grade_answer("der Apfel", "die Apfel"), Quality::BLACKOUT);
        assert_eq!(grade_answer("der Apfel", ""), Quality::BLACKOUT);
    }

    #[test]
    fn test_self_rating_qualities() {
        assert_eq!(SelfRating::Forgot.quality().into_inner(), 0);
        assert_eq!(SelfRating::Hard.quality().into_inner(), 3);
        assert_eq!(SelfRating::Good.quality().into_inner(), 4);
        assert_eq!(SelfRating::Easy.quality().into_inner(), 5);
    }
}
