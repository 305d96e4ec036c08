//! Records seeded into an empty store on first start.

use chrono::NaiveDate;

use crate::models::{Conference, ConferenceStatus, Task, TaskStatus};

fn day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn task(
    id: &str,
    professor: &str,
    area: &str,
    project: &str,
    description: &str,
    dates: [&str; 3],
    status: TaskStatus,
) -> Task {
    let [start, due, finish] = dates;
    Task {
        id: id.to_string(),
        professor: professor.to_string(),
        area: area.to_string(),
        project: project.to_string(),
        task: description.to_string(),
        start_date: day(start),
        due_date: day(due),
        finish_date: day(finish),
        status,
    }
}

fn conference(
    id: &str,
    area: &str,
    name: &str,
    description: &str,
    dates: [&str; 2],
    status: ConferenceStatus,
) -> Conference {
    let [start, finish] = dates;
    Conference {
        id: id.to_string(),
        area: area.to_string(),
        project: name.to_string(),
        task: description.to_string(),
        start_date: day(start),
        finish_date: day(finish),
        status,
    }
}

pub fn sample_tasks() -> Vec<Task> {
    use TaskStatus::*;
    const NAS: &str = "Neural Architecture Search";
    const MT: &str = "Multilingual Transformers";
    const MIS: &str = "Medical Image Segmentation";
    vec![
        task("t1", "Dr. Smith", "ML", NAS, "Literature review on NAS methods", ["2025-12-01", "2026-01-15", "2026-01-10"], Done),
        task("t2", "Dr. Smith", "ML", NAS, "Implement baseline NAS algorithm", ["2026-01-10", "2026-02-28", ""], Ongoing),
        task("t3", "Dr. Smith", "ML", NAS, "Write paper draft for ICML submission", ["2026-02-15", "2026-03-20", ""], Expected),
        task("t4", "Dr. Lee", "NLP", MT, "Collect parallel corpus data", ["2025-11-15", "2026-01-05", "2025-12-28"], Done),
        task("t5", "Dr. Lee", "NLP", MT, "Fine-tune mBERT on collected data", ["2026-01-05", "2026-02-10", ""], Ongoing),
        task("t6", "Dr. Lee", "NLP", MT, "Evaluate on XTREME benchmark", ["2026-02-10", "2026-03-01", ""], Expected),
        task("t7", "Dr. Park", "CV", MIS, "Dataset preprocessing pipeline", ["2025-12-10", "2026-01-20", "2026-01-18"], Done),
        task("t8", "Dr. Park", "CV", MIS, "Train U-Net variant on CT scans", ["2026-01-20", "2026-02-05", ""], Ongoing),
        task("t9", "Dr. Park", "CV", MIS, "Submit to MICCAI 2026", ["2026-02-20", "2026-03-15", ""], Expected),
        task("t10", "Dr. Kim", "RL", "Robotic Control", "Initial proposal", ["2025-10-01", "2025-11-01", ""], Postponed),
    ]
}

pub fn sample_conferences() -> Vec<Conference> {
    use ConferenceStatus::*;
    vec![
        conference("c1", "ML", "ICML 2026", "Paper submission + attendance", ["2026-07-19", "2026-07-25"], WillAttend),
        conference("c2", "NLP", "ACL 2026", "Workshop presentation", ["2026-08-10", "2026-08-15"], Unsure),
        conference("c3", "CV", "CVPR 2026", "Poster session", ["2026-06-14", "2026-06-20"], WillAttend),
        conference("c4", "ML", "NeurIPS 2025", "Attended main conference", ["2025-12-09", "2025-12-15"], Attended),
        conference("c5", "RL", "CoRL 2025", "Could not attend", ["2025-11-05", "2025-11-08"], CantAttend),
    ]
}
