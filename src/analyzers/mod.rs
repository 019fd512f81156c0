//! Course statistics derived from cleaned evaluation records.
//!
//! Instructors are ranked by Wilson lower bound, study time and grading are compared
//! against all courses, and the department catalog is indexed. [`pipeline::PipelineRun`]
//! ties the steps together; the results can be uploaded as JSON to S3.

pub mod assessment;
pub mod catalog;
pub mod grade;
pub mod pipeline;
pub mod ranking;
pub mod time;
pub mod types;
pub mod utility;
pub mod writetos3;
