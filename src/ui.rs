// src/ui.rs

use crate::{constants, symbols};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn plain(message: &str) {
    println!("{}", message);
}

pub fn info(message: &str) {
    println!("{} {}", *symbols::INFO, message);
}

pub fn warn(message: &str) {
    println!("{} {}", *symbols::WARN, message.yellow());
}

pub fn prompt_hidden(message: &str) -> io::Result<String> {
    print!("\n>>> {}: ", message);
    io::stdout().flush()?;
    rpassword::read_password()
}

/// 目录抓取阶段使用的旋转指示器
pub fn new_spinner(prefix: &str) -> ProgressBar {
    let pbar = ProgressBar::new_spinner();
    pbar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold.cyan} [{elapsed_precise}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pbar.set_prefix(prefix.to_string());
    pbar.enable_steady_tick(Duration::from_millis(120));
    pbar
}

/// 按文件数量显示进度的进度条
pub fn new_tasks_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pbar = ProgressBar::new(total);
    pbar.set_style(
        ProgressStyle::with_template(
            "{prefix:7.bold.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}/{len:3} ({percent:>3}%) {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pbar.set_prefix(prefix.to_string());
    pbar
}
