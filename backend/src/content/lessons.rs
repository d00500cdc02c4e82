//! Safety lessons and quiz grading

use once_cell::sync::Lazy;
use serde::Serialize;

/// Share of correct answers needed to pass, in percent
pub const PASS_PERCENT: usize = 70;

/// Multiple-choice question
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question id, unique within its lesson
    pub id: &'static str,
    /// Question text
    pub question: &'static str,
    /// Answer options
    pub options: Vec<&'static str>,
    /// Index of the correct option
    pub correct_answer: usize,
    /// Shown after answering
    pub explanation: &'static str,
}

/// Interactive lesson
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Lesson id
    pub id: &'static str,
    /// Title
    pub title: &'static str,
    /// Short summary
    pub description: &'static str,
    /// Markdown body
    pub content: &'static str,
    /// Quiz questions, graded positionally
    pub questions: Vec<Question>,
}

/// Result of grading one quiz submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizGrade {
    /// Correct answers
    pub score: usize,
    /// Number of questions
    pub total: usize,
    /// Whether the score reaches [`PASS_PERCENT`]
    pub passed: bool,
}

static LESSONS: Lazy<Vec<Lesson>> = Lazy::new(|| {
    vec![
        Lesson {
            id: "lesson-1",
            title: "Good Touch, Bad Touch 🤗",
            description: "Learn about safe and unsafe touches",
            content: "**What is Good Touch?**\n\
                      - Hugs from people you trust 🤗\n\
                      - High-fives with friends ✋\n\
                      - Doctor checkups with parents present 👨‍⚕️\n\n\
                      **What is Bad Touch?**\n\
                      - Touches that make you uncomfortable 😟\n\
                      - Someone touching private areas 🚫\n\
                      - Being forced to touch someone\n\n\
                      **Remember:**\n\
                      - Your body belongs to YOU! 💪\n\
                      - Say NO to uncomfortable touches\n\
                      - Tell a trusted adult immediately",
            questions: vec![
                Question {
                    id: "q1",
                    question: "Which is a good touch?",
                    options: vec![
                        "A hug from mom",
                        "Someone touching private parts",
                        "Being forced to kiss someone",
                    ],
                    correct_answer: 0,
                    explanation: "Hugs from trusted family members are good touches! 🤗",
                },
                Question {
                    id: "q2",
                    question: "What should you do if someone makes you uncomfortable?",
                    options: vec!["Keep it a secret", "Tell a trusted adult", "Do nothing"],
                    correct_answer: 1,
                    explanation: "Always tell a trusted adult! It's never your fault. 💙",
                },
            ],
        },
        Lesson {
            id: "lesson-2",
            title: "My Body, My Rules 💪",
            description: "Understanding body autonomy and consent",
            content: "**Your Body Belongs to You!**\n\
                      - You decide who can touch you\n\
                      - You can say NO at any time 🛑\n\
                      - Even to family and friends\n\n\
                      **Private Parts:**\n\
                      - Parts covered by swimsuit 👙\n\
                      - Only you, parents, or doctors (with parents) can see\n\
                      - Tell an adult if someone asks to see or touch\n\n\
                      **It's Never Your Fault:**\n\
                      - If something bad happens, it's NOT your fault\n\
                      - You can always tell someone\n\
                      - Adults will help you 🌟",
            questions: vec![Question {
                id: "q1",
                question: "Can you say NO to anyone touching you?",
                options: vec!["No, must obey adults", "Yes, always!", "Only to strangers"],
                correct_answer: 1,
                explanation: "YES! You can say NO to anyone, even family. Your body, your choice! 💪",
            }],
        },
        Lesson {
            id: "lesson-3",
            title: "Trusted Adults 👨‍👩‍👧",
            description: "Who to talk to when you need help",
            content: "**Who are Trusted Adults?**\n\
                      - Parents or guardians 👨‍👩‍👧\n\
                      - Teachers 👩‍🏫\n\
                      - School counselors\n\
                      - Police officers 👮\n\
                      - Close family members\n\n\
                      **When to Tell Them:**\n\
                      - Someone makes you uncomfortable\n\
                      - You see something wrong\n\
                      - You have a secret that feels bad\n\
                      - You need help\n\n\
                      **No Secrets Policy:**\n\
                      - Good surprises (birthday party) = OK 🎉\n\
                      - Bad secrets (someone hurting you) = TELL! 🚨",
            questions: vec![Question {
                id: "q1",
                question: "What should you do with a bad secret?",
                options: vec!["Keep it forever", "Tell a trusted adult", "Tell other kids"],
                correct_answer: 1,
                explanation: "Always tell a trusted adult about bad secrets! They will help you. 💙",
            }],
        },
    ]
});

/// The full lesson catalog, in display order
pub fn lessons() -> &'static [Lesson] {
    &LESSONS
}

/// Look up a lesson by id
pub fn find_lesson(lesson_id: &str) -> Option<&'static Lesson> {
    LESSONS.iter().find(|lesson| lesson.id == lesson_id)
}

impl Lesson {
    /// Grade answers positionally; answers past the last question are ignored
    pub fn grade(&self, answers: &[i64]) -> QuizGrade {
        let total = self.questions.len();
        let score = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(question, answer)| {
                usize::try_from(**answer).map_or(false, |a| a == question.correct_answer)
            })
            .count();

        QuizGrade {
            score,
            total,
            passed: score * 100 >= total * PASS_PERCENT,
        }
    }
}
