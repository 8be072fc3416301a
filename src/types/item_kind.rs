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

/// The two sides of a language curriculum: grammar points are reviewed by
/// self-assessment, vocabulary by typing the answer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Grammar,
    Vocabulary,
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Grammar => "grammar",
            ItemKind::Vocabulary => "vocabulary",
        }
    }
}
