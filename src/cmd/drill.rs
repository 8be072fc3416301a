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

use std::io;
use std::io::Write;

use crate::course::Course;
use crate::error::Fallible;
use crate::error::fail;
use crate::grading::SelfRating;
use crate::grading::grade_answer;
use crate::scheduler::Quality;
use crate::types::item::Item;
use crate::types::item_kind::ItemKind;
use crate::types::timestamp::Timestamp;

/// Run a review session over the due queue. Lapsed items go to the back of
/// the queue and come around again until they pass.
pub fn drill(directory: Option<String>) -> Fallible<()> {
    let now = Timestamp::now();
    let mut course = Course::new(directory, now)?;
    let due = course.due_items(now)?;
    if due.is_empty() {
        println!("No items due.");
        return Ok(());
    }
    println!("{} items due.", due.len());
    let mut queue: Vec<Item> = due.into_iter().map(|(item, _)| item).collect();
    let mut passes = 0;
    let mut lapses = 0;
    while !queue.is_empty() {
        let item = queue.remove(0);
        println!();
        let quality = review(&item)?;
        let state = course.db.submit_review(item.hash(), quality, Timestamp::now())?;
        if quality.is_lapse() {
            lapses += 1;
            println!("It will come around again this session.");
            queue.push(item);
        } else {
            passes += 1;
            if state.interval == 1 {
                println!("Next review tomorrow.");
            } else {
                println!("Next review in {} days.", state.interval);
            }
        }
    }
    println!();
    println!("Session done: {passes} passed, {lapses} lapses.");
    Ok(())
}

/// Show one item and collect its quality.
fn review(item: &Item) -> Fallible<Quality> {
    match item.kind() {
        ItemKind::Vocabulary => {
            println!("[{}] {}", item.lesson(), item.prompt());
            let answer = read_line("> ")?;
            let quality = grade_answer(item.answer(), &answer);
            if quality.is_lapse() {
                println!("Wrong. The answer is: {}", item.answer());
            } else {
                println!("Correct.");
            }
            Ok(quality)
        }
        ItemKind::Grammar => {
            println!("[{}] Q: {}", item.lesson(), item.prompt());
            read_line("[press enter to reveal]")?;
            println!("A: {}", item.answer());
            if let Some(notes) = item.notes() {
                println!("({notes})");
            }
            Ok(read_rating()?.quality())
        }
    }
}

fn read_line(prompt: &str) -> Fallible<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    let n = io::stdin().read_line(&mut input)?;
    if n == 0 {
        return fail("unexpected end of input.");
    }
    Ok(input.trim().to_string())
}

fn read_rating() -> Fallible<SelfRating> {
    loop {
        let input = read_line("Grade: (1 = Forgot, 2 = Hard, 3 = Good, 4 = Easy) ")?;
        match input.parse::<u8>() {
            Ok(1) => return Ok(SelfRating::Forgot),
            Ok(2) => return Ok(SelfRating::Hard),
            Ok(3) => return Ok(SelfRating::Good),
            Ok(4) => return Ok(SelfRating::Easy),
            _ => println!("Invalid input. Please enter a number between 1 and 4."),
        }
    }
}
