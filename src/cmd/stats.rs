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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::course::Course;
use crate::error::Fallible;
use crate::queue::due_queue;
use crate::types::item_kind::ItemKind;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    course: String,
    item_count: usize,
    grammar_count: usize,
    vocabulary_count: usize,
    due_count: usize,
    new_count: usize,
    reviews_today: usize,
    total_reviews: usize,
    /// Absent when the course has no tracked items.
    #[serde(skip_serializing_if = "Option::is_none")]
    average_ease: Option<f64>,
}

pub fn print_course_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let now = Timestamp::now();
    let course = Course::new(directory, now)?;
    let stats = course_stats(&course, now)?;
    match format {
        StatsFormat::Text => {
            println!("Course: {}", stats.course);
            println!(
                "Items: {} ({} grammar, {} vocabulary)",
                stats.item_count, stats.grammar_count, stats.vocabulary_count
            );
            println!("Due now: {}", stats.due_count);
            println!("Never reviewed: {}", stats.new_count);
            println!("Reviews today: {}", stats.reviews_today);
            println!("Reviews all time: {}", stats.total_reviews);
            if let Some(ease) = stats.average_ease {
                println!("Average ease: {ease:.2}");
            }
        }
        StatsFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

fn course_stats(course: &Course, now: Timestamp) -> Fallible<Stats> {
    let states = course.db.all_states()?;
    let grammar_count = course
        .items
        .iter()
        .filter(|item| item.kind() == ItemKind::Grammar)
        .count();
    let new_count = states
        .iter()
        .filter(|(_, state)| state.last_reviewed_at.is_none())
        .count();
    let average_ease = if states.is_empty() {
        None
    } else {
        let total: f64 = states
            .iter()
            .map(|(_, state)| state.ease_factor.into_inner())
            .sum();
        Some(total / states.len() as f64)
    };
    Ok(Stats {
        course: course.name.clone(),
        item_count: course.items.len(),
        grammar_count,
        vocabulary_count: course.items.len() - grammar_count,
        due_count: due_queue(&states, now).len(),
        new_count,
        reviews_today: course.db.review_count_since(now.start_of_day())?,
        total_reviews: course.db.review_count()?,
        average_ease,
    })
}
