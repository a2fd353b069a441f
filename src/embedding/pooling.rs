// file: src/embedding/pooling.rs
// description: mean pooling, l2 normalization and dot-product scoring over dense vectors
// reference: https://www.sbert.net/examples/applications/computing-embeddings

const MASK_EPSILON: f32 = 1e-9;
const NORM_EPSILON: f32 = 1e-12;

/// Average the token vectors of one sequence, counting only tokens whose
/// attention mask is set.
pub fn mean_pooling(token_embeddings: &[Vec<f32>], attention_mask: &[u32]) -> Vec<f32> {
    let dim = token_embeddings.first().map_or(0, Vec::len);
    let mut sum = vec![0.0f32; dim];
    let mut count = 0.0f32;

    for (token, &mask) in token_embeddings.iter().zip(attention_mask) {
        if mask == 0 {
            continue;
        }
        let weight = mask as f32;
        for (acc, value) in sum.iter_mut().zip(token) {
            *acc += value * weight;
        }
        count += weight;
    }

    let count = count.max(MASK_EPSILON);
    sum.into_iter().map(|v| v / count).collect()
}

pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt().max(NORM_EPSILON);
    vector.iter().map(|v| v / norm).collect()
}

/// `a @ b^T`: entry `[i][j]` is the dot product of `a[i]` and `b[j]`.
pub fn dot_score(a: &[Vec<f32>], b: &[Vec<f32>]) -> Vec<Vec<f32>> {
    a.iter()
        .map(|row| b.iter().map(|col| dot(row, col)).collect())
        .collect()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
