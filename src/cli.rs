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

use clap::Parser;

use crate::cmd::check::check_course;
use crate::cmd::drill::drill;
use crate::cmd::due::DueFormat;
use crate::cmd::due::print_due_queue;
use crate::cmd::reset::reset_item;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_course_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review the items that are due.
    Drill {
        /// Optional path to the course directory.
        directory: Option<String>,
    },
    /// List the items that are due, most overdue first.
    Due {
        /// Optional path to the course directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = DueFormat::Text)]
        format: DueFormat,
    },
    /// Print statistics about the course.
    Stats {
        /// Optional path to the course directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Check that the course loads cleanly.
    Check {
        /// Optional path to the course directory.
        directory: Option<String>,
    },
    /// Restart an item's schedule from scratch.
    Reset {
        /// The item's hash, or a unique prefix of it.
        item: String,
        /// Optional path to the course directory.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill { directory } => drill(directory),
        Command::Due { directory, format } => print_due_queue(directory, format),
        Command::Stats { directory, format } => print_course_stats(directory, format),
        Command::Check { directory } => check_course(directory),
        Command::Reset { item, directory } => reset_item(directory, &item),
    }
}
