mod labeled_set;
